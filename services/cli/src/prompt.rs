use apply_pilot::workflows::easy_apply::{FormQuestion, OperatorPrompt, PromptError, QuestionKind};
use async_trait::async_trait;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

const SKIP_CHOICE: &str = "(leave unanswered)";

/// Asks the operator on the terminal. Declining leaves the posting to the abandon path.
pub(crate) struct TerminalPrompt;

#[async_trait]
impl OperatorPrompt for TerminalPrompt {
    async fn ask(&self, question: &FormQuestion) -> Result<Option<String>, PromptError> {
        let question = question.clone();
        tokio::task::spawn_blocking(move || read_answer(&question))
            .await
            .map_err(|err| PromptError(err.to_string()))?
    }
}

/// Terminal reads block, so this runs on the blocking pool.
fn read_answer(question: &FormQuestion) -> Result<Option<String>, PromptError> {
    let theme = ColorfulTheme::default();

    match &question.kind {
        QuestionKind::SingleChoice { options } if !options.is_empty() => {
            let mut items = options.clone();
            items.push(SKIP_CHOICE.to_string());
            let choice = Select::with_theme(&theme)
                .with_prompt(&question.label)
                .items(&items)
                .default(0)
                .interact_opt()
                .map_err(|err| PromptError(err.to_string()))?;
            Ok(choice.and_then(|index| options.get(index).cloned()))
        }
        _ => {
            let answer: String = Input::with_theme(&theme)
                .with_prompt(format!("{} (blank to skip)", question.label))
                .allow_empty(true)
                .interact_text()
                .map_err(|err| PromptError(err.to_string()))?;
            let answer = answer.trim();
            Ok((!answer.is_empty()).then(|| answer.to_string()))
        }
    }
}
