use yew::prelude::*;
use shared::{tally_rows, Poll, TallyRow};
use crate::styles::*;

pub fn render_tally(poll: &Poll, own_vote: Option<usize>, can_vote: bool, on_vote: Callback<usize>) -> Html {
    let rows = tally_rows(poll, own_vote);
    html! {
        <div class={SPACE_Y_BASE}>
            <h2 class={HEADING_MD}>{&poll.question}</h2>
            {for rows.iter().map(|row| render_row(row, can_vote, on_vote.clone()))}
            <div class={TEXT_MUTED}>
                {format!("Total votes: {}", poll.total_votes())}
            </div>
            {if let Some(option) = own_vote.and_then(|index| poll.options.get(index)) {
                html! {
                    <div class={combine_classes(STATS_CARD, STATS_CARD_SUCCESS)}>
                        {format!("You voted for \"{option}\"")}
                    </div>
                }
            } else { html! {} }}
        </div>
    }
}

fn render_row(row: &TallyRow, can_vote: bool, on_vote: Callback<usize>) -> Html {
    let index = row.index;
    let onclick = Callback::from(move |_: MouseEvent| on_vote.emit(index));
    let card = if row.is_own_vote {
        combine_classes(CARD_SECTION, "border-green-500")
    } else {
        CARD_SECTION.to_string()
    };

    html! {
        <div class={card}>
            <div class={FLEX_BETWEEN}>
                <span class="text-white break-words">{&row.label}</span>
                <span class={TEXT_MUTED}>
                    {format!("{} votes ({})", row.votes, row.percent_label())}
                </span>
            </div>
            <div class={BAR_TRACK}>
                <div class={BAR_FILL} style={format!("width: {:.1}%", row.percent())}></div>
            </div>
            if can_vote {
                <button type="button" class={button_primary(false)} {onclick}>
                    {"Vote"}
                </button>
            }
        </div>
    }
}
