/*! Integration tests for Waymark.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - navigator: End-to-end flows through the facade, host, and store
 * - sealing: Sealed-bypass scenarios driven through a real host stack
 * - restore: Bootstrap, warm/cold restart, and persistence round-trips
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("waymark=debug".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod helpers;
mod navigator;
mod sealing;
