pub mod goldapi;
