pub mod accounts;
pub mod assignments;
pub mod auth;
pub mod core;
pub mod courses;
pub mod enrollment;
pub mod grades;
pub mod payments;
pub mod routes;
pub mod sections;
pub mod student_views;
pub mod students;
pub mod teachers;
