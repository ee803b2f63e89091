pub mod cipher;
pub mod logging;
