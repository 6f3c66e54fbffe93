mod common;

use std::sync::Arc;

use common::MockEngine;
use dashboard_graph::answer::{AnswerEngine, QueryError, NOT_ENOUGH_INFORMATION, SEARCH_LIMIT};
use dashboard_graph::models::{Confidence, SearchHit};
use serde_json::json;
use speculate2::speculate;
use tokio_test::block_on;

fn hits(n: usize) -> Vec<SearchHit> {
    (1..=n).map(|i| SearchHit::text(format!("fact {}", i))).collect()
}

speculate! {
    describe "answer" {
        it "returns the fixed low-confidence answer when nothing is found" {
            let engine = Arc::new(MockEngine::new());
            let answers = AnswerEngine::new(engine.clone());

            let answer = block_on(answers.answer("Who owns Atlas?")).expect("answer");

            assert_eq!(answer.text, NOT_ENOUGH_INFORMATION);
            assert_eq!(answer.confidence, Confidence::Low);
            assert!(answer.supporting_facts.is_empty());
            assert_eq!(engine.searches(), vec![("Who owns Atlas?".to_string(), SEARCH_LIMIT)]);
        }

        it "short-circuits a blank question without searching" {
            let engine = Arc::new(MockEngine::new().with_hits(hits(2)));
            let answers = AnswerEngine::new(engine.clone());

            let answer = block_on(answers.answer("   ")).expect("answer");

            assert_eq!(answer.confidence, Confidence::Low);
            assert!(engine.searches().is_empty());
        }

        it "enumerates the top three of five hits" {
            let engine = Arc::new(MockEngine::new().with_hits(hits(5)));
            let answers = AnswerEngine::new(engine);

            let answer = block_on(answers.answer("What is in progress?")).expect("answer");

            assert_eq!(answer.confidence, Confidence::High);
            assert_eq!(answer.supporting_facts.len(), 5);
            assert_eq!(
                answer.text,
                "Based on the knowledge graph, I found 5 relevant item(s):\n\n1. fact 1\n2. fact 2\n3. fact 3\n"
            );
        }

        it "renders structured hits by their fact" {
            let engine = Arc::new(MockEngine::new().with_hits(vec![SearchHit(json!({
                "uuid": "e-1",
                "fact": "Ship v1 belongs to Atlas",
            }))]));
            let answers = AnswerEngine::new(engine);

            let answer = block_on(answers.answer("Atlas")).expect("answer");

            assert!(answer.text.contains("1. Ship v1 belongs to Atlas\n"));
        }

        it "surfaces a failed search as an error" {
            let engine = Arc::new(MockEngine::new().failing_search());
            let answers = AnswerEngine::new(engine);

            let err = block_on(answers.answer("Anything?")).unwrap_err();

            assert!(matches!(err, QueryError::Search(_)));
        }
    }

    describe "canned questions" {
        it "asks about tasks in progress" {
            let engine = Arc::new(MockEngine::new());
            let answers = AnswerEngine::new(engine.clone());

            block_on(answers.task_insights()).expect("answer");

            assert_eq!(
                engine.searches()[0].0,
                "What tasks are in progress? What are the priorities?"
            );
        }

        it "asks about project status" {
            let engine = Arc::new(MockEngine::new());
            let answers = AnswerEngine::new(engine.clone());

            block_on(answers.project_overview()).expect("answer");

            assert_eq!(engine.searches()[0].0, "What projects exist? What is their status?");
        }

        it "asks about an entity's connections" {
            let engine = Arc::new(MockEngine::new());
            let answers = AnswerEngine::new(engine.clone());

            block_on(answers.relationships_for("Atlas")).expect("answer");

            assert_eq!(
                engine.searches()[0].0,
                "What is related to Atlas? What are the connections?"
            );
        }
    }
}
