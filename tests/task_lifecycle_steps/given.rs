//! Given steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use rstest_bdd_macros::given;

#[given("a task service with {workers:usize} workers")]
fn task_service(world: &mut TaskLifecycleWorld, workers: usize) -> Result<(), eyre::Report> {
    run_async(async { world.start_service(workers) })
}

#[given("the service has been shut down")]
fn service_shut_down(world: &mut TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let service = world.service()?;
    run_async(service.shutdown());
    Ok(())
}
