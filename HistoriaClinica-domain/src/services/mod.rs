pub mod patients;
pub mod persistence;

// Domain services
// Backend-facing services used by the workflow and the patient list view.

pub use patients::{
    filter_patients, paginate, PatientDirectory, PatientListing, PatientPage, PAGE_SIZE,
};
pub use persistence::{NoopPersistence, PersistenceError, PersistenceGateway};

#[cfg(test)]
pub use persistence::MockPersistenceGateway;
