pub(crate) mod error;
pub(crate) mod kot;
pub(crate) mod login;
pub(crate) mod reference;
