pub mod conversions;
pub mod diagnosis;
pub mod lab;
pub mod medical_history;
pub mod patient;
pub mod physical_exam;
pub mod present_illness;
pub mod treatment;
pub mod vital_signs;

pub use diagnosis::{Diagnosis, DiagnosisField};
pub use lab::{LabFile, LabUpload};
pub use medical_history::{HistoryField, MedicalHistory};
pub use patient::{PatientField, PatientFlag, PatientRecord};
pub use physical_exam::{
    ExamField, FindingKind, GeneralExam, GeneralExamField, NestedExamField, PhysicalExam,
    SpecificFindings, SystemsExam, SystemsExamField,
};
pub use present_illness::{IllnessField, PresentIllness};
pub use treatment::{TreatmentField, TreatmentPlan};
pub use vital_signs::{VitalField, VitalSigns};
