//! tests/mod.rs
//! Pruebas del servicio. Lo que toca red usa los fakes de `support` o un relay local.

mod support;

mod dispatch_tests;
mod personalization_tests;
mod transport_tests;
