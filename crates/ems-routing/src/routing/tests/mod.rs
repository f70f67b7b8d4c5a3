mod common;

mod catalog;
mod ledger;
mod service;
