//! When steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use rstest_bdd_macros::when;
use taskwork::task::domain::{NewTask, TaskId};

#[when(r#"a task titled "{title}" is submitted"#)]
fn submit_task(world: &mut TaskLifecycleWorld, title: String) -> Result<(), eyre::Report> {
    let result = run_async(world.service()?.submit_task(NewTask::new(title)));
    world.last_submission = Some(result);
    Ok(())
}

#[when("task {id:i64} is looked up")]
fn look_up_task(world: &mut TaskLifecycleWorld, id: i64) -> Result<(), eyre::Report> {
    let task_id = TaskId::new(id)?;
    let result = run_async(world.service()?.get_task_status(task_id));
    world.last_lookup = Some(result);
    Ok(())
}
