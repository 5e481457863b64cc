//! Demo data the portal starts with.

use chrono::NaiveDate;

use crate::grading::{ClassRecord, GradeRow, GradingScheme, RecordKey, Term};
use crate::model::{
    Account, ActiveStatus, Activity, ActivityKind, Course, CourseAssignment, CourseStatus,
    EnrollmentRequest, EnrollmentStatus, ParentContact, Payment, PaymentStatus, Role, Section,
    Student, StudentStatus, Submission, SubmissionStatus, Teacher, DEFAULT_SECTION_DESCRIPTION,
};
use crate::repo::{Collection, Repository};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

pub fn demo_repository() -> Repository {
    let mut repo = Repository {
        accounts: Collection::seeded(accounts()),
        students: Collection::seeded(students()),
        teachers: Collection::seeded(teachers()),
        sections: Collection::seeded(sections()),
        courses: Collection::seeded(courses()),
        activities: Collection::seeded(activities()),
        enrollment: Collection::seeded(enrollment_requests()),
        payments: Collection::seeded(payments()),
        scheme: GradingScheme::default(),
        ..Repository::default()
    };
    for s in submissions() {
        repo.add_submission(s);
    }
    let record = class_record();
    repo.class_records.insert(record.key.clone(), record);
    repo
}

fn account(id: &str, name: &str, email: &str, role: Role) -> Account {
    Account {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        role,
        status: ActiveStatus::Active,
    }
}

fn accounts() -> Vec<Account> {
    vec![
        account("1", "John Smith", "john@edu.com", Role::Teacher),
        account("2", "Sarah Davis", "sarah@edu.com", Role::Student),
        account("3", "Mike Wilson", "mike@edu.com", Role::Teacher),
        account("4", "Emily Brown", "emily@edu.com", Role::Student),
    ]
}

fn students() -> Vec<Student> {
    vec![
        Student {
            id: "1".into(),
            name: "Sarah Davis".into(),
            email: "sarah.d@student.edu.com".into(),
            student_id: "STU2024001".into(),
            year_level: 1,
            section: "A".into(),
            phone: Some("+1234567890".into()),
            parent_contact: Some(ParentContact {
                name: "Mary Davis".into(),
                phone: "+1234567800".into(),
            }),
            status: StudentStatus::Active,
            enrolled_courses: vec!["CS101".into(), "MATH101".into(), "ENG101".into()],
            user_id: Some("1".into()),
        },
        Student {
            id: "2".into(),
            name: "Emily Brown".into(),
            email: "emily.b@student.edu.com".into(),
            student_id: "STU2024002".into(),
            year_level: 2,
            section: "B".into(),
            phone: Some("+1234567891".into()),
            parent_contact: None,
            status: StudentStatus::Active,
            enrolled_courses: vec!["CS201".into(), "MATH201".into()],
            user_id: None,
        },
        Student {
            id: "3".into(),
            name: "James Wilson".into(),
            email: "james.w@student.edu.com".into(),
            student_id: "STU2023015".into(),
            year_level: 3,
            section: "A".into(),
            phone: Some("+1234567892".into()),
            parent_contact: None,
            status: StudentStatus::Active,
            enrolled_courses: vec!["CS301".into(), "CS302".into(), "MATH301".into()],
            user_id: None,
        },
    ]
}

fn assignment(course: &str, title: &str, sections: &[&str]) -> CourseAssignment {
    CourseAssignment {
        course: course.into(),
        title: Some(title.into()),
        units: Some(3),
        sections: sections.iter().map(|s| s.to_string()).collect(),
    }
}

fn teachers() -> Vec<Teacher> {
    vec![
        Teacher {
            id: "1".into(),
            first_name: "John".into(),
            last_name: "Smith".into(),
            email: "john.smith@edu.com".into(),
            employee_id: "EMP001".into(),
            phone: Some("+1234567890".into()),
            status: ActiveStatus::Active,
            assigned_courses: vec![
                assignment("CS101", "Sample Course CS101", &["F1", "F2"]),
                assignment("CS201", "Sample Course CS201", &["F1", "F3"]),
            ],
        },
        Teacher {
            id: "2".into(),
            first_name: "Sarah".into(),
            last_name: "Johnson".into(),
            email: "sarah.j@edu.com".into(),
            employee_id: "EMP002".into(),
            phone: Some("+1234567891".into()),
            status: ActiveStatus::Active,
            assigned_courses: vec![assignment("MATH101", "Mathematics 101", &["F1"])],
        },
        Teacher {
            id: "3".into(),
            first_name: "Mike".into(),
            last_name: "Wilson".into(),
            email: "mike.w@edu.com".into(),
            employee_id: "EMP003".into(),
            phone: Some("+1234567892".into()),
            status: ActiveStatus::Active,
            assigned_courses: vec![
                assignment("ENG101", "English 101", &["F2"]),
                assignment("ENG102", "English 102", &[]),
            ],
        },
    ]
}

fn section(id: &str, name: &str, students: &[&str]) -> Section {
    Section {
        id: id.into(),
        name: name.into(),
        students: students.iter().map(|s| s.to_string()).collect(),
        status: ActiveStatus::Active,
        description: DEFAULT_SECTION_DESCRIPTION.into(),
    }
}

#[rustfmt::skip]
fn sections() -> Vec<Section> {
    vec![
        section(
            "1",
            "F1",
            &["John Doe", "Jane Smith", "Carlos Rodriguez", "Maria Garcia", "Ahmed Hassan"],
        ),
        section(
            "2",
            "F2",
            &["Emily Johnson", "David Lee", "Lisa Wong", "Marcus Johnson", "Sarah Williams", "Alex Chen"],
        ),
        section(
            "3",
            "F3",
            &["James Miller", "Patricia Brown", "Robert Davis", "Michael Wilson"],
        ),
        section(
            "4",
            "F4",
            &[
                "Jennifer Taylor",
                "Christopher Anderson",
                "Barbara Thomas",
                "Daniel Jackson",
                "Mary White",
                "Matthew Harris",
                "Linda Martin",
            ],
        ),
        section(
            "5",
            "F5",
            &["Nancy Thompson", "Joseph Garcia", "Karen Martinez", "Ryan Robinson"],
        ),
        section(
            "6",
            "F6",
            &["Susan Clark", "Kevin Rodriguez", "Cynthia Lewis", "Brian Lee", "Kathleen Walker", "Edward Hall"],
        ),
    ]
}

fn course(
    id: &str,
    code: &str,
    title: &str,
    section: &str,
    teacher: &str,
    status: CourseStatus,
) -> Course {
    Course {
        id: id.into(),
        code: code.into(),
        title: title.into(),
        section: section.into(),
        teacher: teacher.into(),
        credits: 3,
        semester: "Fall 2024".into(),
        status,
    }
}

#[rustfmt::skip]
fn courses() -> Vec<Course> {
    vec![
        course("1", "CS101", "Introduction to Computer Science", "A", "Demo Teacher", CourseStatus::Approved),
        course("2", "MATH101", "Mathematics 101", "A", "Demo Teacher", CourseStatus::Approved),
        course("3", "ENG101", "English Literature", "A", "Mike Wilson", CourseStatus::Approved),
        course("4", "GEOM101", "Geometry", "B", "Demo Teacher", CourseStatus::Pending),
        course("5", "CS201", "Data Structures", "B", "John Smith", CourseStatus::Approved),
    ]
}

fn activity(
    id: &str,
    course_code: &str,
    section: &str,
    title: &str,
    kind: ActivityKind,
    due: NaiveDate,
    max_score: f64,
) -> Activity {
    Activity {
        id: id.into(),
        course_code: course_code.into(),
        section: section.into(),
        title: title.into(),
        kind,
        due_date: due,
        max_score,
        total_students: 35,
    }
}

#[rustfmt::skip]
fn activities() -> Vec<Activity> {
    vec![
        activity("1", "CS101", "A", "Programming Assignment 1", ActivityKind::Assignment, date(2025, 1, 25), 100.0),
        activity("2", "CS101", "A", "Midterm Exam", ActivityKind::Exam, date(2025, 1, 20), 100.0),
        activity("3", "CS101", "A", "Quiz 1: Data Structures", ActivityKind::Quiz, date(2025, 1, 15), 50.0),
        activity("4", "CS101", "A", "Group Project Proposal", ActivityKind::Project, date(2025, 1, 12), 100.0),
        activity("5", "MATH101", "A", "Quiz 1: Algebra", ActivityKind::Quiz, date(2025, 1, 25), 50.0),
        activity("6", "MATH101", "A", "Midterm", ActivityKind::Exam, date(2025, 1, 22), 100.0),
        activity("7", "ENG101", "A", "Essay: Shakespeare", ActivityKind::Project, date(2025, 1, 20), 100.0),
        activity("8", "CS201", "B", "Research Paper", ActivityKind::Project, date(2025, 1, 20), 100.0),
    ]
}

fn submission(
    activity_id: &str,
    student_id: &str,
    status: SubmissionStatus,
    score: Option<f64>,
) -> Submission {
    Submission {
        activity_id: activity_id.into(),
        student_id: student_id.into(),
        status,
        score,
    }
}

fn submissions() -> Vec<Submission> {
    use SubmissionStatus::{Graded, Pending, Submitted};
    vec![
        submission("1", "1", Pending, None),
        submission("2", "1", Graded, Some(85.0)),
        submission("3", "1", Graded, Some(45.0)),
        submission("4", "1", Graded, Some(92.0)),
        submission("5", "1", Submitted, None),
        submission("6", "1", Graded, Some(85.0)),
        submission("7", "1", Graded, Some(88.0)),
        submission("8", "2", Submitted, None),
    ]
}

fn grade_row(
    id: &str,
    name: &str,
    written: [f64; 8],
    performance: [f64; 5],
    exam: f64,
) -> GradeRow {
    GradeRow {
        student_id: id.into(),
        name: name.into(),
        written: written.iter().map(|v| Some(*v)).collect(),
        performance: performance.iter().map(|v| Some(*v)).collect(),
        exam: Some(exam),
    }
}

#[rustfmt::skip]
fn class_record() -> ClassRecord {
    ClassRecord::new(
        RecordKey::new("cs101", "12-polaris", Term::Midterm),
        vec![
            grade_row("2024001", "Alagasi, Hyden Cristia A.", [10.0, 10.0, 91.0, 10.0, 8.0, 8.0, 38.0, 85.0], [30.0, 15.0, 0.0, 0.0, 0.0], 60.0),
            grade_row("2024002", "Algoy, Ann Ruslyn My Tolentino", [10.0, 10.0, 80.0, 8.0, 8.0, 8.0, 25.0, 85.0], [30.0, 14.0, 0.0, 0.0, 0.0], 31.0),
            grade_row("2024003", "Alvarez, Jezzabel Orallo", [10.0, 10.0, 84.0, 10.0, 8.0, 8.0, 25.0, 85.0], [30.0, 15.0, 0.0, 0.0, 0.0], 38.0),
            grade_row("2024004", "Ariola, Marienyque Angel R.", [10.0, 10.0, 98.0, 10.0, 8.0, 8.0, 45.0, 85.0], [30.0, 15.0, 0.0, 0.0, 0.0], 49.0),
            grade_row("2024005", "Austria, Jaila Marie Amiten", [10.0, 10.0, 88.0, 10.0, 8.0, 8.0, 32.0, 85.0], [30.0, 13.0, 0.0, 0.0, 0.0], 17.0),
        ],
    )
}

#[rustfmt::skip]
fn enrollment_requests() -> Vec<EnrollmentRequest> {
    let req = |id: &str, student: &str, course: &str, section: &str, status, d| EnrollmentRequest {
        id: id.into(),
        student: student.into(),
        course: course.into(),
        section: section.into(),
        status,
        date: d,
    };
    vec![
        req("1", "Sarah Davis", "Mathematics 101", "Grade 10-A", EnrollmentStatus::Pending, date(2025, 1, 20)),
        req("2", "Emily Brown", "Science 101", "Grade 10-B", EnrollmentStatus::Pending, date(2025, 1, 19)),
        req("3", "Mike Johnson", "English 101", "Grade 11-A", EnrollmentStatus::Approved, date(2025, 1, 18)),
    ]
}

fn payments() -> Vec<Payment> {
    let pay = |id: &str, student: &str, cents, kind: &str, status, d| Payment {
        id: id.into(),
        student: student.into(),
        amount_cents: cents,
        kind: kind.into(),
        status,
        date: d,
    };
    vec![
        pay("1", "Sarah Davis", 50_000, "Tuition", PaymentStatus::Paid, date(2025, 1, 15)),
        pay("2", "Emily Brown", 50_000, "Tuition", PaymentStatus::Pending, date(2025, 1, 10)),
        pay("3", "Mike Johnson", 5_000, "Lab Fee", PaymentStatus::Paid, date(2025, 1, 12)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::Component;

    #[test]
    fn fixture_scores_fit_the_default_scheme() {
        let repo = demo_repository();
        let record = repo.class_records.values().next().expect("record");
        for row in &record.rows {
            for (i, s) in row.written.iter().enumerate() {
                repo.scheme
                    .check_score(Component::Written, Some(i), *s)
                    .expect("written within HPS");
            }
            for (i, s) in row.performance.iter().enumerate() {
                repo.scheme
                    .check_score(Component::Performance, Some(i), *s)
                    .expect("performance within HPS");
            }
            repo.scheme
                .check_score(Component::Exam, None, row.exam)
                .expect("exam within HPS");
        }
    }

    #[test]
    fn demo_student_is_linked_to_login() {
        let repo = demo_repository();
        let s = repo
            .students
            .find(|s| s.user_id.as_deref() == Some("1"))
            .expect("linked student");
        assert_eq!(s.name, "Sarah Davis");
        assert_eq!(repo.students.iter().next().map(|s| s.id.as_str()), Some("1"));
    }
}
