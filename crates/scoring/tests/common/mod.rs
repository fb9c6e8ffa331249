//! Shared fixtures: a small education schema and a deterministic embedder.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tablescout_core::{ColumnMetadata, ScoringConfig, SemanticType, SynonymDictionary, TableMetadata};
use tablescout_graph::SchemaKnowledgeBase;
use tablescout_scoring::{EmbeddingError, EmbeddingService, ScoringService};

/// Word-stem buckets; each bucket is one embedding dimension.
const BUCKETS: &[&[&str]] = &[
    &["student", "learner", "pupil"],
    &["course", "subject", "class"],
    &["enrol", "registr"],
    &["grade", "mark", "score", "exam"],
    &["hostel", "room", "dorm"],
    &["fee", "payment", "paid", "amount"],
];

/// Counts word stems per bucket. Text with no known stem embeds to the zero
/// vector, which is dissimilar to everything.
#[derive(Default)]
pub struct KeywordEmbedder {
    pub calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; BUCKETS.len()];
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            for (dim, stems) in BUCKETS.iter().enumerate() {
                if stems.iter().any(|s| word.starts_with(s)) {
                    v[dim] += 1.0;
                }
            }
        }
        v
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingService for KeywordEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }
}

/// Always fails, to exercise the symbolic-only fallback.
pub struct FailingEmbedder;

impl EmbeddingService for FailingEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Backend("model offline".to_string()))
    }
}

fn id() -> ColumnMetadata {
    ColumnMetadata::new("INTEGER", SemanticType::Identifier).with_hints(true, false, false)
}

/// students_info is referenced by four tables and is the only hub.
pub fn education_tables() -> Vec<TableMetadata> {
    let students = TableMetadata::new("students_info")
        .with_rows(1200)
        .with_description("One row per enrolled student")
        .with_embedding(KeywordEmbedder::vector("students learners"))
        .with_column("Student ID", id().primary_key())
        .with_column("Name", ColumnMetadata::new("TEXT", SemanticType::Text))
        .with_column(
            "Department",
            ColumnMetadata::new("TEXT", SemanticType::Categorical)
                .with_top_values(["Computer Science", "Mathematics", "Physics"])
                .with_hints(true, true, false),
        )
        .with_column(
            "Admission Date",
            ColumnMetadata::new("DATE", SemanticType::Temporal).with_hints(true, false, false),
        );

    let courses = TableMetadata::new("courses")
        .with_rows(80)
        .with_embedding(KeywordEmbedder::vector("courses subjects"))
        .with_column("Course ID", id().primary_key())
        .with_column(
            "Course Name",
            ColumnMetadata::new("TEXT", SemanticType::Text)
                .with_samples(["Data Structures", "Linear Algebra", "Thermodynamics"]),
        )
        .with_column(
            "Credits",
            ColumnMetadata::new("INTEGER", SemanticType::Numerical).with_hints(false, false, true),
        );

    let registration = TableMetadata::new("registration")
        .with_rows(5400)
        .with_embedding(KeywordEmbedder::vector("registration enrolment students courses"))
        .with_column("Registration ID", id().primary_key())
        .with_column("Student ID", id())
        .with_column("Course ID", id())
        .with_column(
            "Status",
            ColumnMetadata::new("TEXT", SemanticType::Categorical)
                .with_samples(["Enrolled", "Dropped", "Completed"]),
        )
        .with_foreign_key("Student ID", "students_info", "Student ID")
        .with_foreign_key("Course ID", "courses", "Course ID");

    let grades = TableMetadata::new("grades")
        .with_rows(5100)
        .with_embedding(KeywordEmbedder::vector("grades marks exams"))
        .with_column("Grade ID", id().primary_key())
        .with_column("Student ID", id())
        .with_column(
            "Marks",
            ColumnMetadata::new("REAL", SemanticType::Numerical)
                .with_hints(true, false, true)
                .with_embedding(KeywordEmbedder::vector("marks score")),
        )
        .with_foreign_key("Student ID", "students_info", "Student ID");

    let hostel = TableMetadata::new("hostel")
        .with_rows(600)
        .with_embedding(KeywordEmbedder::vector("hostel rooms"))
        .with_column("Room No", ColumnMetadata::new("TEXT", SemanticType::Identifier))
        .with_column("Student ID", id())
        .with_foreign_key("Student ID", "students_info", "Student ID");

    let fees = TableMetadata::new("fee_payments")
        .with_rows(3000)
        .with_embedding(KeywordEmbedder::vector("fee payments amount"))
        .with_column("Payment ID", id().primary_key())
        .with_column("Student ID", id())
        .with_column(
            "Amount",
            ColumnMetadata::new("REAL", SemanticType::Numerical).with_hints(false, false, true),
        )
        .with_column(
            "Paid On",
            ColumnMetadata::new("DATE", SemanticType::Temporal).with_hints(true, false, false),
        )
        .with_foreign_key("Student ID", "students_info", "Student ID");

    vec![students, courses, registration, grades, hostel, fees]
}

pub fn education_synonyms() -> SynonymDictionary {
    let mut dict = SynonymDictionary::new();
    dict.insert("students_info", "Student ID", "learner");
    dict.insert("students_info", "Student ID", "pupil");
    dict.insert("hostel", "Room No", "dorm");
    dict
}

/// Set `RUST_LOG=tablescout_scoring=debug` to trace a failing scenario.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn education_kb() -> Arc<SchemaKnowledgeBase> {
    let kb = SchemaKnowledgeBase::builder()
        .tables(education_tables())
        .synonyms(education_synonyms())
        .build()
        .expect("fixture schema is valid");
    Arc::new(kb)
}

/// Symbolic-only service.
pub fn symbolic_service() -> ScoringService {
    init_tracing();
    ScoringService::new(education_kb(), ScoringConfig::default(), None).expect("service")
}

/// Service with the keyword embedder; the embedder is returned for call counting.
pub fn semantic_service() -> (ScoringService, Arc<KeywordEmbedder>) {
    init_tracing();
    let embedder = Arc::new(KeywordEmbedder::default());
    let svc = ScoringService::new(
        education_kb(),
        ScoringConfig::default(),
        Some(embedder.clone() as Arc<dyn EmbeddingService>),
    )
    .expect("service");
    (svc, embedder)
}
