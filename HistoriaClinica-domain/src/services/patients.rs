use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use historia_clinica_data::{
    ClinicalApiTrait, GatewayResult, PatientId, PatientSearchResult, PatientSummary,
};

use crate::derived::{Clock, SystemClock};
use crate::entities::conversions::convert_to_patient_listing;

/// Rows per page on the patient list
pub const PAGE_SIZE: usize = 10;

/// A patient row ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientListing {
    pub id: PatientId,
    pub nombre_completo: String,
    /// Empty when the birth date is missing or unusable
    pub edad: String,
    pub identificacion: String,
    pub email: String,
    pub celular: String,
    pub ciudad: String,
}

/// One page of a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPage<T> {
    pub items: Vec<T>,
    /// 1-based
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

/// Case-insensitive match on name, identification, email, mobile and city
pub fn filter_patients<'a>(patients: &'a [PatientSummary], query: &str) -> Vec<&'a PatientSummary> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return patients.iter().collect();
    }

    patients
        .iter()
        .filter(|patient| {
            let full_name = patient.full_name();
            std::iter::once(full_name.as_str())
                .chain(patient.numero_identificacion.as_deref())
                .chain(patient.email.as_deref())
                .chain(patient.celular.as_deref())
                .chain(patient.ciudad.as_deref())
                .any(|value| value.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Slice out `page` (1-based, clamped into range). There is always at least one page.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> PatientPage<T> {
    let page_size = if page_size == 0 { PAGE_SIZE } else { page_size };
    let total = items.len();
    let total_pages = total.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);

    PatientPage {
        items: items[start..end].to_vec(),
        page,
        total_pages,
        total,
    }
}

/// Patient lookup for the list view
pub struct PatientDirectory<A: ClinicalApiTrait> {
    api: A,
    clock: Arc<dyn Clock>,
}

impl<A: ClinicalApiTrait> PatientDirectory<A> {
    pub fn new(api: A) -> Self {
        Self::with_clock(api, Arc::new(SystemClock))
    }

    pub fn with_clock(api: A, clock: Arc<dyn Clock>) -> Self {
        Self { api, clock }
    }

    /// Search the backend; a blank term is answered locally with no results
    #[instrument(skip_all, fields(term_len = term.trim().chars().count()))]
    pub async fn search(&self, term: &str) -> GatewayResult<PatientSearchResult> {
        let term = term.trim();
        if term.is_empty() {
            debug!("Blank search term, skipping backend call");
            return Ok(PatientSearchResult::empty(term));
        }
        let result = self.api.search_patients(term).await?;
        debug!(count = result.count, "Directory search completed");
        Ok(result)
    }

    /// Display rows for `patients`, ages computed against today
    pub fn listings<'a>(
        &self,
        patients: impl IntoIterator<Item = &'a PatientSummary>,
    ) -> Vec<PatientListing> {
        let today = self.clock.today();
        patients
            .into_iter()
            .map(|patient| convert_to_patient_listing(patient, today))
            .collect()
    }

    /// Filter, paginate and convert in one step
    pub fn page(
        &self,
        patients: &[PatientSummary],
        query: &str,
        page: usize,
    ) -> PatientPage<PatientListing> {
        let rows = self.listings(filter_patients(patients, query));
        paginate(&rows, page, PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use historia_clinica_data::gateway::mock::{ApiCall, MockClinicalApi};

    use crate::derived::FixedClock;

    /// Formatted log output collected in memory
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn patient(id: i64, nombres: &str, apellidos: &str) -> PatientSummary {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "nombres": nombres,
            "apellidos": apellidos
        }))
        .unwrap()
    }

    fn many(n: i64) -> Vec<PatientSummary> {
        (1..=n).map(|i| patient(i, "Paciente", &i.to_string())).collect()
    }

    #[test]
    fn test_filter_matches_any_contact_field() {
        let mut ana = patient(1, "Ana", "Torres");
        ana.ciudad = Some("Guayaquil".to_string());
        let mut luis = patient(2, "Luis", "García");
        luis.email = Some("LUIS@correo.ec".to_string());
        luis.numero_identificacion = Some("0912345678".to_string());
        let list = vec![ana, luis];

        assert_eq!(filter_patients(&list, "ana torres").len(), 1);
        assert_eq!(filter_patients(&list, "guaya")[0].id, PatientId(1));
        assert_eq!(filter_patients(&list, "luis@")[0].id, PatientId(2));
        assert_eq!(filter_patients(&list, "09123")[0].id, PatientId(2));
        assert_eq!(filter_patients(&list, "  ").len(), 2);
        assert!(filter_patients(&list, "cuenca").is_empty());
    }

    #[test]
    fn test_paginate_clamps_pages() {
        let list = many(23);

        let first = paginate(&list, 1, PAGE_SIZE);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total, 23);

        let last = paginate(&list, 99, PAGE_SIZE);
        assert_eq!(last.page, 3);
        assert_eq!(last.items.len(), 3);

        let zero = paginate(&list, 0, PAGE_SIZE);
        assert_eq!(zero.page, 1);
    }

    #[test]
    fn test_empty_list_has_one_page() {
        let page = paginate::<PatientSummary>(&[], 4, PAGE_SIZE);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_blank_search_skips_backend() -> anyhow::Result<()> {
        let api = Arc::new(MockClinicalApi::new());
        let directory = PatientDirectory::new(Arc::clone(&api));

        let result = directory.search("   ").await?;
        assert_eq!(result.count, 0);
        assert_eq!(api.call_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_delegates_trimmed_term() -> anyhow::Result<()> {
        let api = Arc::new(MockClinicalApi::new().with_patients(vec![
            patient(1, "Ana", "Torres"),
            patient(2, "Luis", "García"),
        ]));
        let directory = PatientDirectory::new(Arc::clone(&api));

        let result = directory.search("  ana ").await?;
        assert_eq!(result.count, 1);
        assert_eq!(api.calls(), vec![ApiCall::SearchPatients("ana".to_string())]);
        Ok(())
    }

    #[test]
    fn test_page_builds_listings() {
        let clock = Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        let directory = PatientDirectory::with_clock(MockClinicalApi::new(), clock);

        let mut list = many(12);
        list[11].fecha_nacimiento = Some("2000-01-01".to_string());

        let page = directory.page(&list, "", 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].edad, "24");
        assert_eq!(page.items[0].edad, "");
    }

    #[tokio::test]
    async fn test_search_logs_keep_the_term_out() -> anyhow::Result<()> {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter("historia_clinica_domain=debug")
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let api = MockClinicalApi::new().with_patients(vec![patient(7, "Lucía", "Mora")]);
        let directory = PatientDirectory::new(api);
        let result = directory.search("  Lucía Mora ").await?;
        assert_eq!(result.count, 1);

        let output = logs.contents();
        assert!(output.contains("term_len=10"));
        assert!(output.contains("count=1"));
        assert!(!output.contains("Lucía"));
        assert!(!output.contains("Mora"));
        Ok(())
    }
}
