#![allow(clippy::needless_pass_by_value)]

pub mod book;
pub mod goal;
pub mod init;
pub mod prep;
pub mod settings;
