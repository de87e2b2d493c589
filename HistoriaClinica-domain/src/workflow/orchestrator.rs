use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use historia_clinica_data::{ClinicalApiTrait, PatientId, PatientSummary};

use crate::catalog::{find_icd10, search_icd10, Icd10Entry};
use crate::derived::{apply_age, apply_bmi, Clock, SystemClock};
use crate::entities::conversions::{convert_to_patient_payload, convert_to_patient_record};
use crate::entities::{
    Diagnosis, DiagnosisField, ExamField, FindingKind, HistoryField, IllnessField, LabFile,
    LabUpload, MedicalHistory, NestedExamField, PatientField, PatientFlag, PatientRecord,
    PhysicalExam, PresentIllness, TreatmentField, TreatmentPlan, VitalField, VitalSigns,
};
use crate::forms::SectionForm;
use crate::qr::QrPayload;
use crate::services::PersistenceGateway;
use crate::validation::validate_section;

use super::errors::{ErrorCategory, WorkflowError};
use super::loading::LoadingFlag;
use super::notice::Notice;
use super::tabs::{Tab, TabView};

pub const PATIENT_CREATED: &str = "¡Paciente creado con éxito!";
pub const PRESENT_ILLNESS_SAVED: &str = "Padecimiento actual guardado.";
pub const VITAL_SIGNS_SAVED: &str = "Signos vitales guardados.";
pub const HISTORY_SAVED: &str = "Antecedentes guardados.";
pub const PHYSICAL_EXAM_SAVED: &str = "Exploración física guardada.";
pub const DIAGNOSIS_SAVED: &str = "Diagnóstico guardado.";
pub const TREATMENT_SAVED: &str = "Tratamiento guardado.";
pub const LAB_FILES_REGISTERED: &str = "Archivos de laboratorio registrados.";

type EditResult = Result<bool, WorkflowError>;

/// State holder for one clinical record capture.
///
/// The intake tab creates the patient; every other tab is gated on the
/// resulting id. Edits return `Ok(true)` when the section actually changed.
/// Saves never fail outward: every outcome becomes a [`Notice`].
pub struct ClinicalRecordWorkflow<A: ClinicalApiTrait, P: PersistenceGateway> {
    api: A,
    persistence: P,
    clock: Arc<dyn Clock>,
    loading: LoadingFlag,
    auto_advance: bool,

    active_tab: Tab,
    current_patient_id: Option<PatientId>,
    qr_payload: Option<QrPayload>,
    notice: Option<Notice>,

    patient: PatientRecord,
    present_illness: PresentIllness,
    vital_signs: VitalSigns,
    medical_history: MedicalHistory,
    physical_exam: PhysicalExam,
    diagnosis: Diagnosis,
    treatment_plan: TreatmentPlan,
    lab_upload: LabUpload,
}

impl<A: ClinicalApiTrait, P: PersistenceGateway> ClinicalRecordWorkflow<A, P> {
    pub fn new(api: A, persistence: P) -> Self {
        Self::with_clock(api, persistence, Arc::new(SystemClock))
    }

    pub fn with_clock(api: A, persistence: P, clock: Arc<dyn Clock>) -> Self {
        let physical_exam = PhysicalExam::new(clock.today());
        Self {
            api,
            persistence,
            clock,
            loading: LoadingFlag::default(),
            auto_advance: true,
            active_tab: Tab::PatientIntake,
            current_patient_id: None,
            qr_payload: None,
            notice: None,
            patient: PatientRecord::default(),
            present_illness: PresentIllness::default(),
            vital_signs: VitalSigns::default(),
            medical_history: MedicalHistory::default(),
            physical_exam,
            diagnosis: Diagnosis::default(),
            treatment_plan: TreatmentPlan::default(),
            lab_upload: LabUpload::default(),
        }
    }

    /// Whether a successful creation moves on to the present-illness tab
    pub fn with_auto_advance(mut self, enabled: bool) -> Self {
        self.auto_advance = enabled;
        self
    }

    // --- State ---

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn current_patient_id(&self) -> Option<PatientId> {
        self.current_patient_id
    }

    pub fn qr_payload(&self) -> Option<&QrPayload> {
        self.qr_payload.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_set()
    }

    /// Handle on the loading flag, for observers outside the workflow
    pub fn loading_flag(&self) -> LoadingFlag {
        self.loading.clone()
    }

    /// Outcome of the last action, if any
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Take the last notice, so it is shown once
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn patient(&self) -> &PatientRecord {
        &self.patient
    }

    pub fn present_illness(&self) -> &PresentIllness {
        &self.present_illness
    }

    pub fn vital_signs(&self) -> &VitalSigns {
        &self.vital_signs
    }

    pub fn medical_history(&self) -> &MedicalHistory {
        &self.medical_history
    }

    pub fn physical_exam(&self) -> &PhysicalExam {
        &self.physical_exam
    }

    pub fn diagnosis(&self) -> &Diagnosis {
        &self.diagnosis
    }

    pub fn treatment_plan(&self) -> &TreatmentPlan {
        &self.treatment_plan
    }

    pub fn lab_upload(&self) -> &LabUpload {
        &self.lab_upload
    }

    // --- Tabs ---

    /// Switch tabs; never depends on the current tab being valid or saved
    pub fn select_tab(&mut self, tab: Tab) {
        debug!(from = %self.active_tab, to = %tab, "Tab selected");
        self.active_tab = tab;
    }

    /// Whether the tab's inputs accept edits
    pub fn is_editable(&self, tab: Tab) -> bool {
        self.ensure_editable(tab).is_ok()
    }

    pub fn tabs(&self) -> Vec<TabView> {
        Tab::ALL
            .into_iter()
            .map(|tab| TabView {
                tab,
                label: tab.label(),
                editable: self.is_editable(tab),
                active: tab == self.active_tab,
            })
            .collect()
    }

    fn ensure_editable(&self, tab: Tab) -> Result<(), WorkflowError> {
        match (tab.requires_patient(), self.current_patient_id) {
            (false, Some(id)) => Err(WorkflowError::PatientAlreadyCreated(id)),
            (false, None) => Ok(()),
            (true, Some(_)) => Ok(()),
            (true, None) => Err(WorkflowError::PatientRequired),
        }
    }

    fn ensure_field_editable<T: SectionForm>(
        &self,
        tab: Tab,
        field: T::Field,
    ) -> Result<(), WorkflowError> {
        self.ensure_editable(tab)?;
        if T::is_derived(field) {
            return Err(WorkflowError::DerivedField(T::field_name(field)));
        }
        Ok(())
    }

    // --- Patient intake ---

    pub fn update_patient(&mut self, field: PatientField, value: impl Into<String>) -> EditResult {
        self.ensure_field_editable::<PatientRecord>(Tab::PatientIntake, field)?;
        let next = self.patient.with_field(field, value);
        let next = apply_age(&next, self.clock.today()).unwrap_or(next);
        Ok(commit(&mut self.patient, next))
    }

    pub fn set_patient_flag(&mut self, flag: PatientFlag, value: bool) -> EditResult {
        self.ensure_editable(Tab::PatientIntake)?;
        let next = self.patient.with_flag(flag, value);
        Ok(commit(&mut self.patient, next))
    }

    /// Replace the intake form; the incoming `edad` is ignored and re-derived
    pub fn replace_patient(&mut self, record: PatientRecord) -> EditResult {
        self.ensure_editable(Tab::PatientIntake)?;
        let record = PatientRecord {
            edad: self.patient.edad.clone(),
            ..record
        };
        let next = apply_age(&record, self.clock.today()).unwrap_or(record);
        Ok(commit(&mut self.patient, next))
    }

    // --- Present illness ---

    pub fn update_present_illness(
        &mut self,
        field: IllnessField,
        value: impl Into<String>,
    ) -> EditResult {
        self.ensure_field_editable::<PresentIllness>(Tab::PresentIllness, field)?;
        let next = self.present_illness.with_field(field, value);
        Ok(commit(&mut self.present_illness, next))
    }

    pub fn replace_present_illness(&mut self, section: PresentIllness) -> EditResult {
        self.ensure_editable(Tab::PresentIllness)?;
        let next = self.present_illness.replace(section);
        Ok(commit(&mut self.present_illness, next))
    }

    // --- Vital signs ---

    pub fn update_vital_signs(
        &mut self,
        field: VitalField,
        value: impl Into<String>,
    ) -> EditResult {
        self.ensure_field_editable::<VitalSigns>(Tab::Vitals, field)?;
        let next = self.vital_signs.with_field(field, value);
        let next = apply_bmi(&next).unwrap_or(next);
        Ok(commit(&mut self.vital_signs, next))
    }

    /// Replace the vitals; `imc` is always recomputed from weight and height
    pub fn replace_vital_signs(&mut self, section: VitalSigns) -> EditResult {
        self.ensure_editable(Tab::Vitals)?;
        let next = self.vital_signs.replace(section);
        let next = apply_bmi(&next).unwrap_or(next);
        Ok(commit(&mut self.vital_signs, next))
    }

    // --- Medical history ---

    pub fn update_medical_history(
        &mut self,
        field: HistoryField,
        value: impl Into<String>,
    ) -> EditResult {
        self.ensure_field_editable::<MedicalHistory>(Tab::History, field)?;
        let next = self.medical_history.with_field(field, value);
        Ok(commit(&mut self.medical_history, next))
    }

    pub fn replace_medical_history(&mut self, section: MedicalHistory) -> EditResult {
        self.ensure_editable(Tab::History)?;
        let next = self.medical_history.replace(section);
        Ok(commit(&mut self.medical_history, next))
    }

    // --- Physical exam ---

    pub fn update_physical_exam(
        &mut self,
        field: ExamField,
        value: impl Into<String>,
    ) -> EditResult {
        self.ensure_field_editable::<PhysicalExam>(Tab::PhysicalExam, field)?;
        let next = self.physical_exam.with_field(field, value);
        Ok(commit(&mut self.physical_exam, next))
    }

    pub fn set_exam_nested(
        &mut self,
        field: NestedExamField,
        value: impl Into<String>,
    ) -> EditResult {
        self.ensure_editable(Tab::PhysicalExam)?;
        let next = self.physical_exam.set_nested(field, value);
        Ok(commit(&mut self.physical_exam, next))
    }

    pub fn add_exam_finding(&mut self, kind: FindingKind, text: &str) -> EditResult {
        self.ensure_editable(Tab::PhysicalExam)?;
        let next = self.physical_exam.with_finding(kind, text);
        Ok(commit(&mut self.physical_exam, next))
    }

    pub fn remove_exam_finding(&mut self, kind: FindingKind, index: usize) -> EditResult {
        self.ensure_editable(Tab::PhysicalExam)?;
        let next = self.physical_exam.without_finding(kind, index);
        Ok(commit(&mut self.physical_exam, next))
    }

    pub fn replace_physical_exam(&mut self, section: PhysicalExam) -> EditResult {
        self.ensure_editable(Tab::PhysicalExam)?;
        let next = self.physical_exam.replace(section);
        Ok(commit(&mut self.physical_exam, next))
    }

    // --- Diagnosis ---

    pub fn update_diagnosis(
        &mut self,
        field: DiagnosisField,
        value: impl Into<String>,
    ) -> EditResult {
        self.ensure_field_editable::<Diagnosis>(Tab::Diagnosis, field)?;
        let next = self.diagnosis.with_field(field, value);
        Ok(commit(&mut self.diagnosis, next))
    }

    pub fn replace_diagnosis(&mut self, section: Diagnosis) -> EditResult {
        self.ensure_editable(Tab::Diagnosis)?;
        let next = self.diagnosis.replace(section);
        Ok(commit(&mut self.diagnosis, next))
    }

    /// ICD-10 suggestions for the lookup box
    pub fn search_icd10(&self, term: &str) -> Vec<&'static Icd10Entry> {
        search_icd10(term)
    }

    /// Store `CODE - description` for a code from the reference list
    pub fn select_icd10(&mut self, code: &str) -> EditResult {
        self.ensure_editable(Tab::Diagnosis)?;
        let entry = find_icd10(code).ok_or_else(|| WorkflowError::UnknownIcd10(code.to_string()))?;
        let next = self.diagnosis.with_icd10(entry);
        Ok(commit(&mut self.diagnosis, next))
    }

    // --- Treatment ---

    pub fn update_treatment_plan(
        &mut self,
        field: TreatmentField,
        value: impl Into<String>,
    ) -> EditResult {
        self.ensure_field_editable::<TreatmentPlan>(Tab::Treatment, field)?;
        let next = self.treatment_plan.with_field(field, value);
        Ok(commit(&mut self.treatment_plan, next))
    }

    pub fn replace_treatment_plan(&mut self, section: TreatmentPlan) -> EditResult {
        self.ensure_editable(Tab::Treatment)?;
        let next = self.treatment_plan.replace(section);
        Ok(commit(&mut self.treatment_plan, next))
    }

    // --- Lab ---

    /// Queue files for upload; returns how many are pending
    pub fn add_lab_files(
        &mut self,
        files: impl IntoIterator<Item = LabFile>,
    ) -> Result<usize, WorkflowError> {
        self.ensure_editable(Tab::Lab)?;
        self.lab_upload = self.lab_upload.with_files(files);
        Ok(self.lab_upload.len())
    }

    pub fn remove_lab_file(&mut self, id: Uuid) -> EditResult {
        self.ensure_editable(Tab::Lab)?;
        let next = self.lab_upload.without_file(id);
        Ok(commit(&mut self.lab_upload, next))
    }

    /// Hand pending lab files to the persistence layer
    pub async fn upload_lab_files(&mut self) -> Notice {
        self.save(Tab::Lab).await
    }

    // --- Derived fields ---

    /// Recompute age and BMI, e.g. after the date rolls over
    pub fn refresh_derived_fields(&mut self) -> bool {
        let mut changed = false;
        if let Some(patient) = apply_age(&self.patient, self.clock.today()) {
            self.patient = patient;
            changed = true;
        }
        if let Some(vitals) = apply_bmi(&self.vital_signs) {
            self.vital_signs = vitals;
            changed = true;
        }
        changed
    }

    // --- Record lifecycle ---

    /// Work on an existing patient: loads the intake data and unlocks every tab
    pub fn open_existing_patient(&mut self, id: PatientId, record: PatientRecord) {
        info!(patient_id = %id, "Opening existing patient");
        self.start_new_record();
        self.patient = apply_age(&record, self.clock.today()).unwrap_or(record);
        self.current_patient_id = Some(id);
        self.qr_payload = Some(QrPayload::for_patient(id));
        if self.auto_advance {
            self.active_tab = Tab::PresentIllness;
        }
    }

    /// Open a patient picked from the search results
    pub fn open_patient_summary(&mut self, summary: &PatientSummary) {
        let record = convert_to_patient_record(summary, self.clock.today());
        self.open_existing_patient(summary.id, record);
    }

    /// Discard everything and go back to an empty intake form
    pub fn start_new_record(&mut self) {
        debug!("Starting a new record");
        self.active_tab = Tab::PatientIntake;
        self.current_patient_id = None;
        self.qr_payload = None;
        self.notice = None;
        self.patient = PatientRecord::default();
        self.present_illness = PresentIllness::default();
        self.vital_signs = VitalSigns::default();
        self.medical_history = MedicalHistory::default();
        self.physical_exam = PhysicalExam::new(self.clock.today());
        self.diagnosis = Diagnosis::default();
        self.treatment_plan = TreatmentPlan::default();
        self.lab_upload = LabUpload::default();
    }

    // --- Saving ---

    pub async fn save_active_tab(&mut self) -> Notice {
        self.save(self.active_tab).await
    }

    /// Validate and save one tab; the outcome is also kept as the last notice
    #[instrument(skip(self), fields(patient_id = ?self.current_patient_id))]
    pub async fn save(&mut self, tab: Tab) -> Notice {
        let notice = match self.try_save(tab).await {
            Ok(message) => {
                info!(%tab, "Section saved");
                Notice::success(message)
            }
            Err(e) => {
                match e.category() {
                    ErrorCategory::Network => error!(%tab, "Save failed: {}", e),
                    ErrorCategory::Validation | ErrorCategory::Precondition => {
                        warn!(%tab, "Save refused: {}", e)
                    }
                }
                Notice::error(e.to_string())
            }
        };

        self.notice = Some(notice.clone());
        notice
    }

    async fn try_save(&mut self, tab: Tab) -> Result<&'static str, WorkflowError> {
        match tab {
            Tab::PatientIntake => self.create_patient().await,
            Tab::PresentIllness => {
                let patient_id = self.require_patient()?;
                validate_section(&self.present_illness)?;
                let _loading = self.loading.begin();
                self.persistence
                    .save_present_illness(patient_id, &self.present_illness)
                    .await?;
                Ok(PRESENT_ILLNESS_SAVED)
            }
            Tab::Vitals => {
                let patient_id = self.require_patient()?;
                validate_section(&self.vital_signs)?;
                let _loading = self.loading.begin();
                self.persistence
                    .save_vital_signs(patient_id, &self.vital_signs)
                    .await?;
                Ok(VITAL_SIGNS_SAVED)
            }
            Tab::History => {
                let patient_id = self.require_patient()?;
                validate_section(&self.medical_history)?;
                let _loading = self.loading.begin();
                self.persistence
                    .save_medical_history(patient_id, &self.medical_history)
                    .await?;
                Ok(HISTORY_SAVED)
            }
            Tab::PhysicalExam => {
                let patient_id = self.require_patient()?;
                validate_section(&self.physical_exam)?;
                let _loading = self.loading.begin();
                self.persistence
                    .save_physical_exam(patient_id, &self.physical_exam)
                    .await?;
                Ok(PHYSICAL_EXAM_SAVED)
            }
            Tab::Diagnosis => {
                let patient_id = self.require_patient()?;
                validate_section(&self.diagnosis)?;
                let _loading = self.loading.begin();
                self.persistence
                    .save_diagnosis(patient_id, &self.diagnosis)
                    .await?;
                Ok(DIAGNOSIS_SAVED)
            }
            Tab::Treatment => {
                let patient_id = self.require_patient()?;
                validate_section(&self.treatment_plan)?;
                let _loading = self.loading.begin();
                self.persistence
                    .save_treatment_plan(patient_id, &self.treatment_plan)
                    .await?;
                Ok(TREATMENT_SAVED)
            }
            Tab::Lab => {
                let patient_id = self.require_patient()?;
                if self.lab_upload.is_empty() {
                    return Err(WorkflowError::NoLabFiles);
                }
                let _loading = self.loading.begin();
                self.persistence
                    .upload_lab_files(patient_id, self.lab_upload.files())
                    .await?;
                Ok(LAB_FILES_REGISTERED)
            }
        }
    }

    fn require_patient(&self) -> Result<PatientId, WorkflowError> {
        self.current_patient_id.ok_or(WorkflowError::PatientRequired)
    }

    async fn create_patient(&mut self) -> Result<&'static str, WorkflowError> {
        if let Some(id) = self.current_patient_id {
            return Err(WorkflowError::PatientAlreadyCreated(id));
        }

        validate_section(&self.patient)?;
        let payload = convert_to_patient_payload(&self.patient)?;

        let created = {
            let _loading = self.loading.begin();
            self.api.create_patient(&payload).await?
        };

        info!(patient_id = %created.id, "Patient created");
        self.current_patient_id = Some(created.id);
        self.qr_payload = Some(QrPayload::for_patient(created.id));
        if self.auto_advance {
            self.active_tab = Tab::PresentIllness;
        }
        Ok(PATIENT_CREATED)
    }
}

fn commit<T: PartialEq>(slot: &mut T, next: T) -> bool {
    if *slot == next {
        false
    } else {
        *slot = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::pending;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use historia_clinica_data::gateway::mock::{ApiCall, MockClinicalApi};

    use crate::derived::FixedClock;
    use crate::services::{MockPersistenceGateway, NoopPersistence, PersistenceError};
    use crate::workflow::NoticeKind;

    // Initialize tracing once for all tests
    static INIT: std::sync::Once = std::sync::Once::new();
    fn initialize() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter("debug")
                .with_test_writer()
                .try_init();
        });
    }

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 8, 20).unwrap()))
    }

    fn workflow<P: PersistenceGateway>(
        api: MockClinicalApi,
        persistence: P,
    ) -> ClinicalRecordWorkflow<MockClinicalApi, P> {
        initialize();
        ClinicalRecordWorkflow::with_clock(api, persistence, clock())
    }

    fn fill_valid_patient<P: PersistenceGateway>(
        wf: &mut ClinicalRecordWorkflow<MockClinicalApi, P>,
    ) {
        wf.update_patient(PatientField::Nombres, "María").unwrap();
        wf.update_patient(PatientField::Apellidos, "Pérez").unwrap();
        wf.update_patient(PatientField::FechaNacimiento, "2000-08-15").unwrap();
        wf.update_patient(PatientField::Sexo, "Femenino").unwrap();
        wf.update_patient(PatientField::NumeroIdentificacion, "0912345678").unwrap();
    }

    #[test]
    fn test_initial_state() {
        let wf = workflow(MockClinicalApi::new(), NoopPersistence);

        assert_eq!(wf.active_tab(), Tab::PatientIntake);
        assert!(wf.current_patient_id().is_none());
        assert!(!wf.is_loading());
        assert_eq!(wf.physical_exam().fecha_exploracion, "2024-08-20");

        let editable: Vec<Tab> = wf
            .tabs()
            .into_iter()
            .filter(|t| t.editable)
            .map(|t| t.tab)
            .collect();
        assert_eq!(editable, vec![Tab::PatientIntake]);
    }

    #[test]
    fn test_dependent_edits_are_gated() {
        let mut wf = workflow(MockClinicalApi::new(), NoopPersistence);

        let err = wf
            .update_vital_signs(VitalField::Peso, "70")
            .unwrap_err();
        assert!(matches!(err, WorkflowError::PatientRequired));
        assert!(wf.add_lab_files(vec![LabFile::new("a.pdf", 1)]).is_err());
        assert!(wf.select_icd10("R51").is_err());
        assert_eq!(wf.vital_signs(), &VitalSigns::default());
    }

    #[test]
    fn test_tab_switch_is_unconditional() {
        let mut wf = workflow(MockClinicalApi::new(), NoopPersistence);
        wf.select_tab(Tab::Lab);
        assert_eq!(wf.active_tab(), Tab::Lab);
        assert!(wf.tabs().iter().any(|t| t.tab == Tab::Lab && t.active && !t.editable));
    }

    #[test]
    fn test_age_follows_birth_date() {
        let mut wf = workflow(MockClinicalApi::new(), NoopPersistence);

        assert!(wf.update_patient(PatientField::FechaNacimiento, "2000-08-15").unwrap());
        assert_eq!(wf.patient().edad, "24");

        // Same value again is not a change
        assert!(!wf.update_patient(PatientField::FechaNacimiento, "2000-08-15").unwrap());

        let err = wf.update_patient(PatientField::Edad, "99").unwrap_err();
        assert!(matches!(err, WorkflowError::DerivedField("edad")));
    }

    #[test]
    fn test_replace_patient_rederives_age() {
        let mut wf = workflow(MockClinicalApi::new(), NoopPersistence);
        let record = PatientRecord {
            fecha_nacimiento: "2000-08-21".to_string(),
            edad: "5".to_string(),
            ..PatientRecord::default()
        };

        assert!(wf.replace_patient(record).unwrap());
        assert_eq!(wf.patient().edad, "23");
    }

    #[tokio::test]
    async fn test_dependent_save_without_patient_makes_no_call() {
        let mut persistence = MockPersistenceGateway::new();
        persistence.expect_save_vital_signs().never();
        let mut wf = workflow(MockClinicalApi::new(), persistence);

        let notice = wf.save(Tab::Vitals).await;
        assert_eq!(notice, Notice::error("Debe crear o seleccionar un paciente primero."));
        assert_eq!(wf.notice(), Some(&notice));
        assert_eq!(wf.api().call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_intake_surfaces_first_violation() {
        let mut wf = workflow(MockClinicalApi::new(), NoopPersistence);
        wf.update_patient(PatientField::Nombres, "A").unwrap();

        let notice = wf.save_active_tab().await;
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Mínimo 2 caracteres");
        assert_eq!(wf.api().call_count(), 0);
        assert!(wf.current_patient_id().is_none());
    }

    #[tokio::test]
    async fn test_patient_creation_unlocks_tabs() {
        let mut wf = workflow(MockClinicalApi::new().with_next_patient_id(41), NoopPersistence);
        fill_valid_patient(&mut wf);

        let notice = wf.save(Tab::PatientIntake).await;
        assert_eq!(notice, Notice::success(PATIENT_CREATED));
        assert_eq!(wf.current_patient_id(), Some(PatientId(41)));
        assert_eq!(wf.qr_payload().unwrap().as_str(), "ID del Paciente: 41");
        assert_eq!(wf.active_tab(), Tab::PresentIllness);
        assert!(!wf.is_loading());

        // Intake is locked, everything else is open
        assert!(!wf.is_editable(Tab::PatientIntake));
        assert!(Tab::ALL.iter().skip(1).all(|tab| wf.is_editable(*tab)));

        match &wf.api().calls()[0] {
            ApiCall::CreatePatient(body) => {
                assert_eq!(body["numeroIdentificacion"], "0912345678");
                assert_eq!(body["edad"], "24");
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_second_create_is_refused() {
        let mut wf = workflow(MockClinicalApi::new(), NoopPersistence);
        fill_valid_patient(&mut wf);
        wf.save(Tab::PatientIntake).await;

        let notice = wf.save(Tab::PatientIntake).await;
        assert!(notice.is_error());
        assert_eq!(wf.api().call_count(), 1);
        assert!(matches!(
            wf.update_patient(PatientField::Nombres, "Otra"),
            Err(WorkflowError::PatientAlreadyCreated(PatientId(1)))
        ));
    }

    #[tokio::test]
    async fn test_auto_advance_can_be_disabled() {
        let mut wf = workflow(MockClinicalApi::new(), NoopPersistence).with_auto_advance(false);
        fill_valid_patient(&mut wf);
        wf.save(Tab::PatientIntake).await;
        assert_eq!(wf.active_tab(), Tab::PatientIntake);
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_patient_unset() {
        let api = MockClinicalApi::new().with_failure(400, "Identificación duplicada");
        let mut wf = workflow(api, NoopPersistence);
        fill_valid_patient(&mut wf);

        let notice = wf.save(Tab::PatientIntake).await;
        assert_eq!(notice, Notice::error("Identificación duplicada"));
        assert!(wf.current_patient_id().is_none());
        assert!(wf.qr_payload().is_none());
        assert!(!wf.is_loading());
    }

    #[tokio::test]
    async fn test_vitals_save_calls_persistence_with_section() {
        let mut persistence = MockPersistenceGateway::new();
        persistence
            .expect_save_vital_signs()
            .withf(|id, vitals| *id == PatientId(3) && vitals.imc == "22.9")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut wf = workflow(MockClinicalApi::new(), persistence);
        wf.open_existing_patient(PatientId(3), PatientRecord::default());
        wf.update_vital_signs(VitalField::Peso, "70").unwrap();
        wf.update_vital_signs(VitalField::Talla, "175").unwrap();

        let notice = wf.save(Tab::Vitals).await;
        assert_eq!(notice, Notice::success(VITAL_SIGNS_SAVED));
    }

    #[tokio::test]
    async fn test_invalid_vitals_never_reach_persistence() {
        let mut persistence = MockPersistenceGateway::new();
        persistence.expect_save_vital_signs().never();

        let mut wf = workflow(MockClinicalApi::new(), persistence);
        wf.open_existing_patient(PatientId(3), PatientRecord::default());
        wf.update_vital_signs(VitalField::Temperatura, "50").unwrap();

        let notice = wf.save(Tab::Vitals).await;
        assert_eq!(notice, Notice::error("Temperatura máximo 45"));
    }

    #[tokio::test]
    async fn test_persistence_failure_becomes_notice() {
        let mut persistence = MockPersistenceGateway::new();
        persistence
            .expect_save_diagnosis()
            .returning(|_, _| {
                Err(PersistenceError::Rejected(
                    "Servicio no disponible".to_string(),
                ))
            });

        let mut wf = workflow(MockClinicalApi::new(), persistence);
        wf.open_existing_patient(PatientId(8), PatientRecord::default());
        wf.update_diagnosis(DiagnosisField::Principal, "Cefalea tensional").unwrap();

        let notice = wf.save(Tab::Diagnosis).await;
        assert_eq!(notice, Notice::error("Servicio no disponible"));
        assert!(!wf.is_loading());
    }

    #[tokio::test]
    async fn test_icd10_selection() {
        let mut wf = workflow(MockClinicalApi::new(), NoopPersistence);
        wf.open_existing_patient(PatientId(2), PatientRecord::default());

        assert_eq!(wf.search_icd10("dispep")[0].code, "K30");
        assert!(wf.search_icd10("").is_empty());

        assert!(wf.select_icd10("k30").unwrap());
        assert_eq!(wf.diagnosis().cie10, "K30 - Dispepsia");
        assert!(matches!(
            wf.select_icd10("X99"),
            Err(WorkflowError::UnknownIcd10(_))
        ));
    }

    #[tokio::test]
    async fn test_lab_upload_requires_files_and_keeps_them() {
        let mut persistence = MockPersistenceGateway::new();
        persistence
            .expect_upload_lab_files()
            .withf(|id, files| *id == PatientId(4) && files.len() == 2)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut wf = workflow(MockClinicalApi::new(), persistence);
        wf.open_existing_patient(PatientId(4), PatientRecord::default());

        let notice = wf.upload_lab_files().await;
        assert_eq!(notice, Notice::error("Seleccione al menos un archivo"));

        let first = LabFile::new("hemograma.pdf", 4096);
        let pending = wf
            .add_lab_files(vec![
                first.clone(),
                LabFile::new("orina.pdf", 1024),
                LabFile::new("rx.png", 9000),
            ])
            .unwrap();
        assert_eq!(pending, 3);
        assert!(wf.remove_lab_file(first.id).unwrap());
        assert!(!wf.remove_lab_file(first.id).unwrap());

        let notice = wf.upload_lab_files().await;
        assert_eq!(notice, Notice::success(LAB_FILES_REGISTERED));
        assert_eq!(wf.lab_upload().len(), 2);
    }

    #[tokio::test]
    async fn test_exam_edits() {
        let mut wf = workflow(MockClinicalApi::new(), NoopPersistence);
        wf.open_existing_patient(PatientId(6), PatientRecord::default());

        wf.set_exam_nested(NestedExamField::ImpresionClinica, "Paciente estable").unwrap();
        wf.add_exam_finding(FindingKind::Anormal, "Hepatomegalia").unwrap();
        assert!(!wf.add_exam_finding(FindingKind::Anormal, "  ").unwrap());
        wf.update_physical_exam(ExamField::ExploradoPor, "Dr. Salas").unwrap();
        assert!(wf.remove_exam_finding(FindingKind::Anormal, 0).unwrap());

        let exam = wf.physical_exam();
        assert_eq!(exam.hallazgos_especificos.impresion_clinica, "Paciente estable");
        assert!(exam.findings(FindingKind::Anormal).is_empty());
        assert_eq!(exam.explorado_por, "Dr. Salas");

        let notice = wf.save(Tab::PhysicalExam).await;
        assert_eq!(notice.message, PHYSICAL_EXAM_SAVED);
    }

    #[tokio::test]
    async fn test_start_new_record_resets_everything() {
        let mut wf = workflow(MockClinicalApi::new(), NoopPersistence);
        wf.open_existing_patient(PatientId(6), PatientRecord::default());
        wf.update_treatment_plan(TreatmentField::Medicamentos, "Omeprazol").unwrap();
        wf.save(Tab::Treatment).await;

        wf.start_new_record();
        assert!(wf.current_patient_id().is_none());
        assert!(wf.qr_payload().is_none());
        assert!(wf.notice().is_none());
        assert_eq!(wf.active_tab(), Tab::PatientIntake);
        assert_eq!(wf.treatment_plan(), &TreatmentPlan::default());
    }

    #[tokio::test]
    async fn test_open_patient_summary() {
        let mut wf = workflow(MockClinicalApi::new(), NoopPersistence);
        let summary: PatientSummary = serde_json::from_value(serde_json::json!({
            "id": 15,
            "nombres": "Jorge",
            "apellidos": "Castro",
            "fechaNacimiento": "1970-01-01"
        }))
        .unwrap();

        wf.open_patient_summary(&summary);
        assert_eq!(wf.current_patient_id(), Some(PatientId(15)));
        assert_eq!(wf.patient().edad, "54");
        assert_eq!(wf.active_tab(), Tab::PresentIllness);
    }

    /// Persistence that never answers
    struct StalledPersistence;

    type SaveResult = Result<(), PersistenceError>;

    #[async_trait]
    impl PersistenceGateway for StalledPersistence {
        async fn save_present_illness(&self, _: PatientId, _: &PresentIllness) -> SaveResult {
            pending().await
        }
        async fn save_vital_signs(&self, _: PatientId, _: &VitalSigns) -> SaveResult {
            pending().await
        }
        async fn save_medical_history(&self, _: PatientId, _: &MedicalHistory) -> SaveResult {
            pending().await
        }
        async fn save_physical_exam(&self, _: PatientId, _: &PhysicalExam) -> SaveResult {
            pending().await
        }
        async fn save_diagnosis(&self, _: PatientId, _: &Diagnosis) -> SaveResult {
            pending().await
        }
        async fn save_treatment_plan(&self, _: PatientId, _: &TreatmentPlan) -> SaveResult {
            pending().await
        }
        async fn upload_lab_files(&self, _: PatientId, _: &[LabFile]) -> SaveResult {
            pending().await
        }
    }

    #[tokio::test]
    async fn test_loading_clears_when_save_is_abandoned() {
        let mut wf = workflow(MockClinicalApi::new(), StalledPersistence);
        wf.open_existing_patient(PatientId(1), PatientRecord::default());
        let flag = wf.loading_flag();

        let outcome = tokio::time::timeout(Duration::from_millis(20), wf.save(Tab::Vitals)).await;
        assert!(outcome.is_err());
        assert!(!flag.is_set());
        assert!(!wf.is_loading());
    }

    /// A clock the test can move forward
    struct SettableClock(std::sync::Mutex<NaiveDate>);

    impl Clock for SettableClock {
        fn today(&self) -> NaiveDate {
            *self.0.lock().unwrap()
        }
    }

    #[test]
    fn test_refresh_derived_fields_after_birthday() {
        initialize();
        let day = |d| NaiveDate::from_ymd_opt(2024, 8, d).unwrap();
        let clock = Arc::new(SettableClock(std::sync::Mutex::new(day(20))));
        let mut wf = ClinicalRecordWorkflow::with_clock(
            MockClinicalApi::new(),
            NoopPersistence,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );

        let record = PatientRecord {
            fecha_nacimiento: "2000-08-25".to_string(),
            ..PatientRecord::default()
        };
        wf.open_existing_patient(PatientId(3), record);
        assert_eq!(wf.patient().edad, "23");
        assert!(!wf.refresh_derived_fields());

        *clock.0.lock().unwrap() = day(25);
        assert!(wf.refresh_derived_fields());
        assert_eq!(wf.patient().edad, "24");
        assert!(!wf.refresh_derived_fields());
    }
}
