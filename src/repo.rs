//! The single owned store behind every view.
//!
//! Each entity type lives in one `Collection`, keyed by id. Views read and
//! write through the same collection, so an edit made from a detail page is
//! what the list page sees next.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::error::{PortalError, PortalResult};
use crate::grading::{ClassRecord, GradingScheme, RecordKey};
use crate::model::{
    Account, Activity, Course, EnrollmentRequest, Payment, Section, Student, Submission, Teacher,
};

pub trait Record: Clone {
    /// Entity name used in `not_found` errors.
    const ENTITY: &'static str;

    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($ty:ty, $entity:literal) => {
        impl Record for $ty {
            const ENTITY: &'static str = $entity;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

impl_record!(Account, "user");
impl_record!(Student, "student");
impl_record!(Teacher, "teacher");
impl_record!(Section, "section");
impl_record!(Course, "course");
impl_record!(Activity, "activity");
impl_record!(EnrollmentRequest, "enrollment request");
impl_record!(Payment, "payment");

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone)]
struct Stored<T> {
    seq: u64,
    record: T,
}

/// Records keyed by id; iteration is newest first.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    entries: BTreeMap<String, Stored<T>>,
    next_seq: u64,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<T: Record> Collection<T> {
    /// Seeds in display order: the first record is listed first.
    pub fn seeded(records: Vec<T>) -> Self {
        let mut c = Self::default();
        for r in records.into_iter().rev() {
            c.insert(r);
        }
        c
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds or overwrites by id; a new record lands at the front.
    pub fn insert(&mut self, record: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries
            .insert(record.id().to_string(), Stored { seq, record });
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id).map(|s| &s.record)
    }

    pub fn require(&self, id: &str) -> PortalResult<&T> {
        self.get(id).ok_or_else(|| PortalError::not_found(T::ENTITY, id))
    }

    pub fn require_mut(&mut self, id: &str) -> PortalResult<&mut T> {
        self.entries
            .get_mut(id)
            .map(|s| &mut s.record)
            .ok_or_else(|| PortalError::not_found(T::ENTITY, id))
    }

    /// Swaps in a new version of an existing record, keeping its position.
    pub fn replace(&mut self, record: T) -> PortalResult<T> {
        let slot = self
            .entries
            .get_mut(record.id())
            .ok_or_else(|| PortalError::not_found(T::ENTITY, record.id()))?;
        Ok(std::mem::replace(&mut slot.record, record))
    }

    pub fn remove(&mut self, id: &str) -> PortalResult<T> {
        self.entries
            .remove(id)
            .map(|s| s.record)
            .ok_or_else(|| PortalError::not_found(T::ENTITY, id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let mut stored: Vec<&Stored<T>> = self.entries.values().collect();
        stored.sort_by(|a, b| b.seq.cmp(&a.seq));
        stored.into_iter().map(|s| &s.record)
    }

    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<&T> {
        self.iter().find(|r| pred(r))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Repository {
    pub accounts: Collection<Account>,
    pub students: Collection<Student>,
    pub teachers: Collection<Teacher>,
    pub sections: Collection<Section>,
    pub courses: Collection<Course>,
    pub activities: Collection<Activity>,
    pub enrollment: Collection<EnrollmentRequest>,
    pub payments: Collection<Payment>,
    /// Keyed by (activity id, student id).
    pub submissions: HashMap<(String, String), Submission>,
    pub class_records: BTreeMap<RecordKey, ClassRecord>,
    pub scheme: GradingScheme,
}

impl Repository {
    pub fn submission(&self, activity_id: &str, student_id: &str) -> Option<&Submission> {
        self.submissions
            .get(&(activity_id.to_string(), student_id.to_string()))
    }

    pub fn add_submission(&mut self, submission: Submission) {
        self.submissions.insert(
            (
                submission.activity_id.clone(),
                submission.student_id.clone(),
            ),
            submission,
        );
    }

    pub fn submissions_for_activity<'a>(
        &'a self,
        activity_id: &'a str,
    ) -> impl Iterator<Item = &'a Submission> + 'a {
        self.submissions
            .values()
            .filter(move |s| s.activity_id == activity_id)
    }

    /// Roster size of a section by name; 0 when the section is unknown.
    pub fn section_size(&self, name: &str) -> usize {
        self.sections
            .find(|s| s.name == name)
            .map(|s| s.students.len())
            .unwrap_or(0)
    }
}
