use wasm_bindgen::JsValue;
use web_sys::HtmlSelectElement;
use yew::prelude::*;
use yew_router::prelude::*;
use shared::{PollId, SyncError, SyncSession, SyncState};
use crate::{
    api::HttpPollApi,
    config::CONFIG,
    render_tally::render_tally,
    scheduler::BrowserScheduler,
    storage::BrowserStorage,
    styles::*,
    Route,
};

type Session = SyncSession<HttpPollApi, BrowserScheduler, BrowserStorage>;

pub enum Msg {
    Synced(SyncState),
    Select(PollId),
    Vote(usize),
    VoteFinished(Option<PollId>, Result<(), SyncError>),
}

/// Live poll list with the selected poll's tally.
pub struct PollBoard {
    session: Session,
    state: SyncState,
    voting: bool,
    notice: Option<String>,
}

impl Component for PollBoard {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let on_change = ctx.link().callback(Msg::Synced);
        let session = SyncSession::new(
            HttpPollApi::new(CONFIG.api_base_url),
            BrowserScheduler,
            BrowserStorage,
            CONFIG.sync_config(),
            move |state: &SyncState| on_change.emit(state.clone()),
        );
        session.start();

        Self {
            state: session.state(),
            session,
            voting: false,
            notice: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Synced(state) => {
                if state.selected_poll_id != self.state.selected_poll_id {
                    self.notice = None;
                }
                self.state = state;
                true
            }
            Msg::Select(poll_id) => {
                self.notice = None;
                self.session.select(poll_id);
                true
            }
            Msg::Vote(option) => {
                if self.voting {
                    return false;
                }
                self.voting = true;
                self.notice = None;
                let session = self.session.clone();
                let poll_id = self.state.selected_poll_id;
                ctx.link().send_future(async move {
                    Msg::VoteFinished(poll_id, session.vote(option).await)
                });
                true
            }
            Msg::VoteFinished(poll_id, result) => {
                self.voting = false;
                if let Err(error) = &result {
                    web_sys::console::error_1(&JsValue::from(format!("Vote failed: {error}")));
                }
                self.notice = vote_notice(poll_id, self.state.selected_poll_id, &result);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class={CONTAINER}>
                <div class={FLEX_BETWEEN}>
                    <h1 class={HEADING_LG}>{"Polls"}</h1>
                    <Link<Route> to={Route::CreatePoll} classes={classes!(button_primary(false))}>
                        {"New Poll"}
                    </Link<Route>>
                </div>
                {self.render_status()}
                {self.render_picker(ctx)}
                {self.render_selected(ctx)}
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.session.teardown();
    }
}

impl PollBoard {
    fn render_status(&self) -> Html {
        let message = self.notice.clone().or_else(|| self.state.last_error.clone());
        html! {
            <>
                if let Some(message) = message {
                    <div class={alert_style("error")}>{message}</div>
                }
                if self.state.directory_stale || self.state.detail_stale {
                    <div class={alert_style("warning")}>
                        {"Having trouble reaching the server. Showing the last known results."}
                    </div>
                }
            </>
        }
    }

    fn render_picker(&self, ctx: &Context<Self>) -> Html {
        if self.state.directory.is_empty() {
            return html! {
                <div class={TEXT_MUTED}>{"No polls yet. Create the first one."}</div>
            };
        }

        let onchange = ctx.link().batch_callback(|e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            select.value().parse::<PollId>().ok().map(Msg::Select)
        });
        let selected = self.state.selected_poll_id;

        html! {
            <div class={SPACE_Y_BASE}>
                <label class={TEXT_LABEL}>{"Choose a poll"}</label>
                <select class={INPUT_BASE} {onchange}>
                    {for self.state.directory.iter().map(|summary| html! {
                        <option value={summary.id.to_string()} selected={selected == Some(summary.id)}>
                            {&summary.question}
                        </option>
                    })}
                </select>
            </div>
        }
    }

    fn render_selected(&self, ctx: &Context<Self>) -> Html {
        match (&self.state.selected_poll, self.state.selected_poll_id) {
            (Some(poll), _) => html! {
                <div class={combine_classes(CARD_SECTION, "mt-6")}>
                    {render_tally(
                        poll,
                        self.state.own_vote,
                        self.state.can_vote() && !self.voting,
                        ctx.link().callback(Msg::Vote),
                    )}
                </div>
            },
            (None, Some(_)) => html! {
                <div class={TEXT_MUTED}>{"Loading poll..."}</div>
            },
            (None, None) => html! {},
        }
    }
}

/// Only a failure for the poll still on screen is worth showing.
fn vote_notice(voted_on: Option<PollId>, selected: Option<PollId>, result: &Result<(), SyncError>) -> Option<String> {
    match result {
        Err(error) if voted_on == selected => Some(error.user_message()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_for_current_poll_is_shown() {
        let result = Err(SyncError::VoteInFlight(1));
        assert_eq!(vote_notice(Some(1), Some(1), &result), Some("Your vote is being submitted.".into()));
    }

    #[test]
    fn failure_for_previous_poll_is_dropped() {
        let result = Err(SyncError::AlreadyVoted { poll_id: 1, option: 0 });
        assert_eq!(vote_notice(Some(1), Some(2), &result), None);
        assert_eq!(vote_notice(Some(2), Some(2), &Ok(())), None);
    }
}
