pub mod guru_question_entity;
