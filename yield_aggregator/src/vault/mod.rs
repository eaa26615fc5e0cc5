//! The vault: settings, ledger and the engine that moves funds between venues.

pub(crate) mod ledger;
pub(crate) mod lock;
pub(crate) mod run;
pub(crate) mod settings;
pub(crate) mod stable;
// As a safety measure, the executable vault is only reachable through `run`.
pub(in crate::vault) mod executable;
