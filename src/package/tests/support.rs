//! Shared fixtures for package tests.

use crate::task::{
    domain::TaskId,
    ports::{TaskJob, TaskQueue, TaskQueueResult},
};
use async_trait::async_trait;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};
use zip::write::SimpleFileOptions;

/// Builds a zip archive in memory from `(name, contents)` pairs.
pub(super) fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start zip entry");
        writer.write_all(contents).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

pub(super) const SCORM12_MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest identifier="course" version="1.0"
    xmlns="http://www.imsproject.org/xsd/imscp_rootv1p1p2"
    xmlns:adlcp="http://www.adlnet.org/xsd/adlcp_rootv1p2">
  <metadata>
    <schema>ADL SCORM</schema>
    <schemaversion>1.2</schemaversion>
  </metadata>
  <organizations default="ORG1">
    <organization identifier="ORG1">
      <title>Course</title>
      <item identifier="ITEM1" identifierref="R1"><title>Lesson</title></item>
    </organization>
  </organizations>
  <resources>
    <resource identifier="R1" type="webcontent" adlcp:scormtype="sco" href="content/index.html"/>
  </resources>
</manifest>"#;

/// Queue that holds jobs until a test runs them.
#[derive(Default)]
pub(super) struct ManualQueue {
    jobs: Mutex<Vec<(TaskId, TaskJob)>>,
}

impl ManualQueue {
    /// Runs every held job to completion, in submission order.
    pub(super) async fn run_all(&self) {
        let jobs = std::mem::take(&mut *self.jobs.lock().expect("queue lock"));
        for (_, job) in jobs {
            job.await;
        }
    }

    pub(super) fn held(&self) -> Vec<TaskId> {
        self.jobs
            .lock()
            .expect("queue lock")
            .iter()
            .map(|(task_id, _)| *task_id)
            .collect()
    }
}

#[async_trait]
impl TaskQueue for ManualQueue {
    async fn submit(&self, task_id: TaskId, job: TaskJob) -> TaskQueueResult<()> {
        self.jobs.lock().expect("queue lock").push((task_id, job));
        Ok(())
    }

    async fn cancel(&self, task_id: TaskId) -> TaskQueueResult<bool> {
        let mut jobs = self.jobs.lock().expect("queue lock");
        let before = jobs.len();
        jobs.retain(|(held, _)| *held != task_id);
        Ok(jobs.len() != before)
    }
}

/// Shared handle so tests can keep the queue after handing it over.
pub(super) fn manual_queue() -> Arc<ManualQueue> {
    Arc::new(ManualQueue::default())
}
