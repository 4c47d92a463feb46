#![forbid(unsafe_code)]

pub mod agenda;
pub mod cli;
pub mod cms;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod markup;
pub mod richtext;
pub mod routes;
pub mod site;
pub mod ui;
