//! Pure operator logic: weighted message selection and the session gate.

pub mod selection;
pub mod session;
