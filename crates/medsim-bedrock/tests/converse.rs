//! Live Bedrock test.
//!
//! Requires AWS credentials with `bedrock:InvokeModel` on the model below.
//!
//! Run with: `cargo test -p medsim-bedrock --test converse -- --ignored`

use jiff::Timestamp;

use medsim_bedrock::client::build_aws_config;
use medsim_bedrock::{BedrockReplyGenerator, ReplyContext, ReplyGenerator};
use medsim_core::models::state::PatientState;
use medsim_core::CaseCatalog;

const MODEL_ID: &str = "us.anthropic.claude-haiku-4-5-20251001-v1:0";

#[tokio::test]
#[ignore]
async fn generates_an_in_character_reply() {
    let config = build_aws_config("us-east-1").await;
    let generator = BedrockReplyGenerator::new(&config, MODEL_ID).unwrap();

    let catalog = CaseCatalog::bundled().unwrap();
    let case = catalog.get("mi-001").unwrap();
    let state = PatientState::new(&case, Timestamp::now());
    let ctx = ReplyContext::capture(&case, &state, "Can you describe the pain?", 6);

    let reply = generator.generate(&ctx).await.unwrap();
    println!("reply: {reply}");
    assert!(!reply.trim().is_empty());
}

#[test]
fn empty_model_id_is_rejected() {
    let config = aws_config::SdkConfig::builder().build();
    assert!(BedrockReplyGenerator::new(&config, "  ").is_err());
}
