//! End-to-end tests through the salvo router.

mod helpers;

mod errors;
mod options;
mod propfind;
mod report;
mod resource;
mod sync;
