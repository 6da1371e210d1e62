//! Built-in record schemas. Each is built once on first use and shared
//! read-only afterwards.

pub mod checkout;
pub mod loan;
pub mod slices;

use once_cell::sync::Lazy;

use crate::spec::form::FormSpec;

static CHECKOUT: Lazy<FormSpec> = Lazy::new(checkout::build);
static LOAN: Lazy<FormSpec> = Lazy::new(loan::build);

pub const FORM_IDS: [&str; 2] = [checkout::FORM_ID, loan::FORM_ID];

pub fn checkout() -> &'static FormSpec {
    &CHECKOUT
}

pub fn loan() -> &'static FormSpec {
    &LOAN
}

pub fn by_id(id: &str) -> Option<&'static FormSpec> {
    match id {
        checkout::FORM_ID => Some(checkout()),
        loan::FORM_ID => Some(loan()),
        _ => None,
    }
}
