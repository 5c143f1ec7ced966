use wasm_bindgen::JsValue;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;
use shared::{
    validate_create_request, CreatePollRequest, Poll, SyncError,
    MAX_OPTIONS, MAX_OPTION_LENGTH, MAX_QUESTION_LENGTH, MIN_OPTIONS,
};
use crate::{api::HttpPollApi, config::CONFIG, styles::*, Route};

pub enum Msg {
    UpdateQuestion(String),
    UpdateOption(usize, String),
    AddOption,
    RemoveOption(usize),
    Submit,
    SubmitResult(Result<Poll, SyncError>),
}

pub struct PollCreate {
    question: String,
    options: Vec<String>,
    error: Option<String>,
    submitting: bool,
}

impl Component for PollCreate {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            question: String::new(),
            options: vec![String::new(); MIN_OPTIONS],
            error: None,
            submitting: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::UpdateQuestion(value) => {
                self.question = value;
                true
            }
            Msg::UpdateOption(index, value) => {
                if let Some(option) = self.options.get_mut(index) {
                    *option = value;
                }
                true
            }
            Msg::AddOption => {
                if self.options.len() < MAX_OPTIONS {
                    self.options.push(String::new());
                }
                true
            }
            Msg::RemoveOption(index) => {
                if self.options.len() > MIN_OPTIONS && index < self.options.len() {
                    self.options.remove(index);
                }
                true
            }
            Msg::Submit => {
                let request = CreatePollRequest {
                    question: self.question.clone(),
                    options: self.options.clone(),
                }.trimmed();
                if let Err(error) = validate_create_request(&request) {
                    self.error = Some(error.to_string());
                    return true;
                }

                self.submitting = true;
                self.error = None;
                ctx.link().send_future(async move {
                    let api = HttpPollApi::new(CONFIG.api_base_url);
                    Msg::SubmitResult(api.create_poll(&request).await)
                });
                true
            }
            Msg::SubmitResult(Ok(poll)) => {
                web_sys::console::log_1(&JsValue::from(format!("Created poll {}", poll.id)));
                if let Some(navigator) = ctx.link().navigator() {
                    navigator.push(&Route::Board);
                }
                false
            }
            Msg::SubmitResult(Err(error)) => {
                web_sys::console::error_1(&JsValue::from(format!("Poll creation failed: {error}")));
                self.error = Some(error.user_message());
                self.submitting = false;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });
        let onquestion = ctx.link().callback(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Msg::UpdateQuestion(input.value())
        });

        html! {
            <div class={BG_PAGE}>
                <div class={CARD}>
                    <h1 class={HEADING_LG}>{"Create New Poll"}</h1>
                    if let Some(error) = &self.error {
                        <div class={alert_style("error")}>{error}</div>
                    }
                    <form {onsubmit} class={SPACE_Y_LG}>
                        <div class={SPACE_Y_BASE}>
                            <label class={TEXT_LABEL}>
                                {format!("Question ({}/{})", self.question.chars().count(), MAX_QUESTION_LENGTH)}
                            </label>
                            <input type="text" class={INPUT_BASE} value={self.question.clone()}
                                maxlength={MAX_QUESTION_LENGTH.to_string()} oninput={onquestion}
                                placeholder="What should we decide?" />
                        </div>
                        {self.render_options(ctx)}
                        <button type="submit" class={button_primary(true)} disabled={self.submitting}>
                            {if self.submitting { "Creating..." } else { "Create Poll" }}
                        </button>
                    </form>
                </div>
            </div>
        }
    }
}

impl PollCreate {
    fn render_options(&self, ctx: &Context<Self>) -> Html {
        let can_remove = self.options.len() > MIN_OPTIONS;
        html! {
            <div class={SPACE_Y_BASE}>
                <div class={FLEX_BETWEEN}>
                    <label class={TEXT_LABEL}>{"Options"}</label>
                    <span class={TEXT_MUTED}>
                        {format!("Options: {}/{}", self.options.len(), MAX_OPTIONS)}
                    </span>
                </div>
                {for self.options.iter().enumerate().map(|(index, option)| {
                    let oninput = ctx.link().callback(move |e: InputEvent| {
                        let input: HtmlInputElement = e.target_unchecked_into();
                        Msg::UpdateOption(index, input.value())
                    });
                    html! {
                        <div class="flex gap-2">
                            <input type="text" class={INPUT_BASE} value={option.clone()}
                                maxlength={MAX_OPTION_LENGTH.to_string()} {oninput}
                                placeholder={format!("Option {}", index + 1)} />
                            if can_remove {
                                <button type="button"
                                    class={combine_classes(BUTTON_BASE, BUTTON_DANGER)}
                                    onclick={ctx.link().callback(move |_| Msg::RemoveOption(index))}>
                                    {"Remove"}
                                </button>
                            }
                        </div>
                    }
                })}
                <button type="button"
                    class={button_primary(false)}
                    disabled={self.options.len() >= MAX_OPTIONS}
                    onclick={ctx.link().callback(|_| Msg::AddOption)}>
                    {"Add option"}
                </button>
            </div>
        }
    }
}
