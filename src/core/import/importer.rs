//! Import orchestration
//!
//! [`ReturnsImporter`] runs one document through the whole pipeline:
//!
//! 1. **Parse** the document and map every return from the document alone
//! 2. **Resolve** region codes for all distinct licences (one batched call)
//! 3. **Build** return identifiers
//! 4. **Augment** with due dates from the record store (one batched call)
//! 5. **Validate** each assembled record against the schema
//!
//! A parse failure or a failed collaborator call aborts the import. Anything
//! wrong with a single return, including a value that cannot go into a
//! canonical record, is recorded as a [`RecordFailure`] and the remaining
//! returns carry on.

use super::checksum::document_checksum;
use super::context::ImportContext;
use super::outcome::{FailureKind, ImportOutcome, RecordFailure};
use crate::adapters::traits::{ExistingReturn, RegionResolver, ReturnRecordStore};
use crate::core::document::{
    distinct_licence_numbers, extract_returns, paths, Namespaces, Navigator, XmlDocument,
    MULTI_RETURN_NAMESPACE,
};
use crate::core::mapping::{map_return, MappedReturn, MappingError};
use crate::core::validation::{CanonicalReturnSchema, ReturnValidator};
use crate::domain::{LicenceNumber, Result, ReturnId, ServiceError};
use crate::{log_collaborator_call, log_error_with_context, log_import_start};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

/// Default bound on each collaborator call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const REGION_RESOLVER: &str = "region resolver";
const RETURN_RECORD_STORE: &str = "return record store";

/// A mapped return, or the failure that keeps it out of the output
type MappedEntry = std::result::Result<MappedReturn, RecordFailure>;

/// Imports multi-return documents
///
/// Holds only immutable settings and shared collaborators, so one importer can
/// serve concurrent imports.
pub struct ReturnsImporter {
    resolver: Arc<dyn RegionResolver + Send + Sync>,
    store: Arc<dyn ReturnRecordStore + Send + Sync>,
    validator: Arc<dyn ReturnValidator>,
    namespaces: Namespaces,
    request_timeout: Duration,
}

impl ReturnsImporter {
    /// Create an importer using the canonical schema and the standard
    /// multi-return namespace
    pub fn new(
        resolver: Arc<dyn RegionResolver + Send + Sync>,
        store: Arc<dyn ReturnRecordStore + Send + Sync>,
    ) -> Self {
        Self {
            resolver,
            store,
            validator: Arc::new(CanonicalReturnSchema::new()),
            namespaces: Namespaces::multi_return(MULTI_RETURN_NAMESPACE),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Replace the record validator
    pub fn with_validator(mut self, validator: Arc<dyn ReturnValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Replace the namespace bindings used to read documents
    pub fn with_namespaces(mut self, namespaces: Namespaces) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// Set the bound on each collaborator call
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Import one document
    ///
    /// Records and failures in the outcome are both in document order.
    ///
    /// # Errors
    ///
    /// Returns [`RillError::Parse`](crate::domain::RillError::Parse) if the
    /// document does not have the expected shape, and
    /// [`RillError::Service`](crate::domain::RillError::Service) if either
    /// batched call fails or times out. No partial output is produced.
    pub async fn import_document(&self, xml: &str, context: &ImportContext) -> Result<ImportOutcome> {
        let import_id = Uuid::new_v4();
        let span = tracing::info_span!("import", import_id = %import_id);
        self.run(import_id, xml, context).instrument(span).await
    }

    async fn run(&self, import_id: Uuid, xml: &str, context: &ImportContext) -> Result<ImportOutcome> {
        let start_time = Instant::now();
        let checksum = document_checksum(xml.as_bytes());
        log_import_start!(xml.len(), checksum);

        let mut outcome = ImportOutcome::new(import_id, checksum);

        let (mapped, licence_numbers) = self.map_document(xml)?;
        outcome.total_returns = mapped.len();
        outcome.total_licences = licence_numbers.len();

        let regions = if licence_numbers.is_empty() {
            HashMap::new()
        } else {
            log_collaborator_call!(REGION_RESOLVER, licence_numbers.len());
            self.bounded(
                REGION_RESOLVER,
                self.resolver.resolve_region_codes(&licence_numbers),
            )
            .await?
        };

        let return_ids: Vec<Option<ReturnId>> = mapped
            .iter()
            .map(|entry| {
                let ret = entry.as_ref().ok()?;
                regions.get(&ret.licence_number).map(|region| ret.return_id(*region))
            })
            .collect();

        let lookup = distinct_return_ids(&return_ids);
        let existing: HashMap<ReturnId, ExistingReturn> = if lookup.is_empty() {
            HashMap::new()
        } else {
            log_collaborator_call!(RETURN_RECORD_STORE, lookup.len());
            self.bounded(RETURN_RECORD_STORE, self.store.fetch_existing_returns(&lookup))
                .await?
                .into_iter()
                .map(|existing| (existing.return_id.clone(), existing))
                .collect()
        };

        for (entry, return_id) in mapped.into_iter().zip(return_ids) {
            match entry {
                Ok(ret) => self.assemble(&mut outcome, ret, return_id, &existing, context),
                Err(failure) => outcome.add_failure(failure),
            }
        }

        let outcome = outcome.with_duration(start_time.elapsed());
        outcome.log_summary();
        Ok(outcome)
    }

    /// Parses the document and maps every return, before any await point
    ///
    /// Returns with unusable values are rejected in place, in document order.
    fn map_document(&self, xml: &str) -> Result<(Vec<MappedEntry>, Vec<LicenceNumber>)> {
        let document = XmlDocument::parse(xml)?;
        let nav = Navigator::new(&self.namespaces);

        let entries = extract_returns(&nav, document.root())?;
        let licence_numbers = distinct_licence_numbers(&entries);

        let mut mapped = Vec::with_capacity(entries.len());
        for entry in &entries {
            match map_return(&nav, entry) {
                Ok(ret) => mapped.push(Ok(ret)),
                Err(MappingError::Invalid(violation)) => {
                    let reference = nav.text(entry.node, paths::RETURN_REFERENCE, "");
                    let failure = RecordFailure::new(
                        FailureKind::SchemaViolation,
                        entry.licence_number.as_str(),
                        reference,
                        format!("Return cannot form a canonical record: {violation}"),
                    )
                    .with_violations(vec![violation]);
                    mapped.push(Err(failure));
                }
                Err(MappingError::Fatal(e)) => return Err(e),
            }
        }

        Ok((mapped, licence_numbers))
    }

    fn assemble(
        &self,
        outcome: &mut ImportOutcome,
        ret: MappedReturn,
        return_id: Option<ReturnId>,
        existing: &HashMap<ReturnId, ExistingReturn>,
        context: &ImportContext,
    ) {
        let reference = ret.return_reference.to_string();

        let Some(return_id) = return_id else {
            let message = format!("No region code found for licence {}", ret.licence_number);
            outcome.add_failure(RecordFailure::new(
                FailureKind::UnresolvedLicence,
                ret.licence_number,
                reference,
                message,
            ));
            return;
        };

        let Some(found) = existing.get(&return_id) else {
            let message = format!("Return {return_id} not found in the return record store; due date unknown");
            outcome.add_failure(
                RecordFailure::new(
                    FailureKind::UnmatchedAugmentation,
                    ret.licence_number,
                    reference,
                    message,
                )
                .with_return_id(return_id),
            );
            return;
        };

        tracing::debug!(return_id = %return_id, status = %found.status, "Matched stored return");

        let licence_number = ret.licence_number.clone();
        let record = ret.into_canonical(return_id.clone(), found.due_date, context);
        let report = self.validator.validate(&record);
        if report.is_valid() {
            outcome.records.push(record);
        } else {
            outcome.add_failure(
                RecordFailure::new(
                    FailureKind::SchemaViolation,
                    licence_number,
                    reference,
                    format!("Record failed schema validation: {}", report.format_summary()),
                )
                .with_return_id(return_id)
                .with_violations(report.violations),
            );
        }
    }

    /// Awaits a collaborator call within the request timeout
    async fn bounded<T>(&self, service: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                log_error_with_context!(&e, service);
                Err(e)
            }
            Err(_) => {
                let e = ServiceError::Timeout(format!(
                    "{service} did not respond within {} ms",
                    self.request_timeout.as_millis()
                ));
                log_error_with_context!(&e, service);
                Err(e.into())
            }
        }
    }
}

/// Identifiers to look up, first-seen order, without duplicates
fn distinct_return_ids(return_ids: &[Option<ReturnId>]) -> Vec<ReturnId> {
    let mut seen = HashSet::new();
    let mut distinct = Vec::new();
    for return_id in return_ids.iter().flatten() {
        if seen.insert(return_id) {
            distinct.push(return_id.clone());
        }
    }
    distinct
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RegionCode, RillError, UserType};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticResolver {
        regions: HashMap<LicenceNumber, RegionCode>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RegionResolver for StaticResolver {
        async fn resolve_region_codes(
            &self,
            _licence_numbers: &[LicenceNumber],
        ) -> Result<HashMap<LicenceNumber, RegionCode>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.regions.clone())
        }
    }

    /// Knows every id it is asked about
    struct EchoStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ReturnRecordStore for EchoStore {
        async fn fetch_existing_returns(&self, return_ids: &[ReturnId]) -> Result<Vec<ExistingReturn>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(return_ids
                .iter()
                .map(|id| ExistingReturn {
                    return_id: id.clone(),
                    due_date: NaiveDate::from_ymd_opt(2020, 4, 28).unwrap(),
                    status: "due".to_string(),
                })
                .collect())
        }
    }

    struct SlowStore;

    #[async_trait]
    impl ReturnRecordStore for SlowStore {
        async fn fetch_existing_returns(&self, _return_ids: &[ReturnId]) -> Result<Vec<ExistingReturn>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }
    }

    fn nil_submission() -> String {
        format!(
            r#"<tns:GORSubmission xmlns:tns="{MULTI_RETURN_NAMESPACE}">
              <tns:Permit><tns:IrPermitNo>01/001</tns:IrPermitNo>
                <tns:Return>
                  <tns:ReturnReference>1</tns:ReturnReference>
                  <tns:ReturnReportingPeriodStartDate>2019-04-01</tns:ReturnReportingPeriodStartDate>
                  <tns:ReturnReportingPeriodEndDate>2020-03-31</tns:ReturnReportingPeriodEndDate>
                  <tns:GorPart><tns:NilReturnStructure><tns:IsNilReturn>yes</tns:IsNilReturn></tns:NilReturnStructure></tns:GorPart>
                </tns:Return>
              </tns:Permit>
            </tns:GORSubmission>"#
        )
    }

    fn resolver() -> Arc<StaticResolver> {
        let mut regions = HashMap::new();
        regions.insert(LicenceNumber::new("01/001").unwrap(), RegionCode::new(1).unwrap());
        Arc::new(StaticResolver {
            regions,
            calls: AtomicUsize::new(0),
        })
    }

    fn context() -> ImportContext {
        ImportContext::for_user("import@example.gov.uk", UserType::Internal, "entity-1")
    }

    #[tokio::test]
    async fn test_nil_return_imported() {
        let resolver = resolver();
        let store = Arc::new(EchoStore {
            calls: AtomicUsize::new(0),
        });
        let importer = ReturnsImporter::new(resolver.clone(), store.clone());

        let outcome = importer.import_document(&nil_submission(), &context()).await.unwrap();

        assert_eq!(outcome.records.len(), 1, "{:?}", outcome.failures);
        assert_eq!(
            outcome.records[0].return_id.as_str(),
            "v1:1:01/001:1:2019-04-01:2020-03-31"
        );
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.document_checksum.len(), 64);
    }

    #[tokio::test]
    async fn test_empty_document_makes_no_calls() {
        let resolver = resolver();
        let store = Arc::new(EchoStore {
            calls: AtomicUsize::new(0),
        });
        let importer = ReturnsImporter::new(resolver.clone(), store.clone());
        let xml = format!(r#"<tns:GORSubmission xmlns:tns="{MULTI_RETURN_NAMESPACE}"/>"#);

        let outcome = importer.import_document(&xml, &context()).await.unwrap();

        assert_eq!(outcome.total_returns, 0);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_timeout_aborts_import() {
        let importer = ReturnsImporter::new(resolver(), Arc::new(SlowStore))
            .with_request_timeout(Duration::from_millis(50));

        let result = importer.import_document(&nil_submission(), &context()).await;

        assert!(matches!(
            result,
            Err(RillError::Service(ServiceError::Timeout(_)))
        ));
    }

    #[tokio::test]
    async fn test_invalid_reference_rejects_only_its_return() {
        let store = Arc::new(EchoStore {
            calls: AtomicUsize::new(0),
        });
        let importer = ReturnsImporter::new(resolver(), store.clone());
        let xml = nil_submission().replace(
            "</tns:Permit>",
            "<tns:Return>\
               <tns:ReturnReference>AB12</tns:ReturnReference>\
               <tns:ReturnReportingPeriodStartDate>2019-04-01</tns:ReturnReportingPeriodStartDate>\
               <tns:ReturnReportingPeriodEndDate>2020-03-31</tns:ReturnReportingPeriodEndDate>\
             </tns:Return></tns:Permit>",
        );

        let outcome = importer.import_document(&xml, &context()).await.unwrap();

        assert_eq!(outcome.total_returns, 2);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        let failure = &outcome.failures[0];
        assert_eq!(failure.kind, FailureKind::SchemaViolation);
        assert_eq!(failure.return_reference, "AB12");
        assert_eq!(failure.violations[0].field, "returnId");
        assert!(failure.return_id.is_none());
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_distinct_return_ids() {
        let licence = LicenceNumber::new("01/001").unwrap();
        let make = |reference: &str| {
            ReturnId::build(
                RegionCode::new(1).unwrap(),
                &licence,
                &crate::domain::ReturnReference::new(reference).unwrap(),
                NaiveDate::from_ymd_opt(2019, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2020, 3, 31).unwrap(),
            )
        };

        let ids = vec![Some(make("2")), None, Some(make("1")), Some(make("2"))];
        assert_eq!(distinct_return_ids(&ids), vec![make("2"), make("1")]);
    }
}
