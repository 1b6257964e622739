mod rupees;

pub mod helpers;
pub mod op;
mod secret;

pub use rupees::{PaiseConversionError, Rupees, INR_CURRENCY_CODE, INR_CURRENCY_CODE_LOWER};
pub use secret::Secret;
