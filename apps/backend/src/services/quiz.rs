//! Quiz generation from stored notes.

use quiz_core::{generate_questions, QuestionCount};
use uuid::Uuid;

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::models::QuizDetailResponse;

/// Generate and persist a quiz from one of the user's notes.
///
/// Nothing is stored when the note yields no questions.
pub async fn generate_quiz(
    db: &Database,
    user_id: Uuid,
    note_id: Uuid,
    count: QuestionCount,
) -> Result<QuizDetailResponse> {
    let note = db.get_note(user_id, note_id).await?;

    let generated = generate_questions(&note.content, count.get());
    if generated.is_empty() {
        tracing::info!(%note_id, "Note has no material for questions");
        return Err(ApiError::NoQuestions(
            "add more complete sentences to the note".to_string(),
        ));
    }

    let (quiz, questions) = db.create_quiz(&note, &generated).await?;
    tracing::info!(
        quiz_id = %quiz.id,
        %note_id,
        requested = count.get(),
        generated = questions.len(),
        "Quiz generated"
    );

    Ok(QuizDetailResponse { quiz, questions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteRequest;

    const CELL_NOTE: &str = "The mitochondria is the powerhouse of the cell. \
        Photosynthesis converts sunlight into chemical energy.";

    async fn note_with(db: &Database, user: Uuid, content: &str) -> Uuid {
        let req = NoteRequest {
            title: "Cells".to_string(),
            content: content.to_string(),
            subject: String::new(),
        };
        db.create_note(user, &req).await.unwrap().id
    }

    #[tokio::test]
    async fn test_generates_one_question_per_sentence() {
        let db = Database::in_memory();
        let user = Uuid::new_v4();
        let note_id = note_with(&db, user, CELL_NOTE).await;

        let detail = generate_quiz(&db, user, note_id, QuestionCount::default())
            .await
            .unwrap();
        assert_eq!(detail.quiz.title, "Cells - Quiz");
        assert_eq!(detail.questions.len(), 2);
        for q in &detail.questions {
            assert!(q.question.contains("_____"));
            assert_eq!(q.options.len(), 4);
        }
    }

    #[tokio::test]
    async fn test_sparse_note_creates_nothing() {
        let db = Database::in_memory();
        let user = Uuid::new_v4();
        let note_id = note_with(&db, user, "Too short. Tiny.").await;

        let err = generate_quiz(&db, user, note_id, QuestionCount::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NoQuestions(_)));
        assert!(db.list_quizzes(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_note_is_not_found() {
        let db = Database::in_memory();
        let note_id = note_with(&db, Uuid::new_v4(), CELL_NOTE).await;

        let err = generate_quiz(&db, Uuid::new_v4(), note_id, QuestionCount::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
