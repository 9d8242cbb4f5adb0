use std::io;
use std::thread;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs search jobs away from the controller thread.
pub trait Executor {
    fn execute(&self, job: Job) -> io::Result<()>;
}

/// One short-lived named thread per job.
#[derive(Debug, Default)]
pub struct ThreadExecutor;

impl Executor for ThreadExecutor {
    fn execute(&self, job: Job) -> io::Result<()> {
        thread::Builder::new()
            .name("encore-search".to_string())
            .spawn(job)
            .map(|_| ())
    }
}
