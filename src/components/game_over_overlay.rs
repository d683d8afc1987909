use crate::model::Score;
use crate::render::{score_line, winner_text};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct GameOverOverlayProps {
    pub show: bool,
    pub score: Score,
    pub new_game: Callback<()>,
}

#[function_component]
pub fn GameOverOverlay(props: &GameOverOverlayProps) -> Html {
    if !props.show {
        return html! {};
    }
    let new_game_btn = {
        let cb = props.new_game.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {
        <div style="position:absolute; bottom:24px; left:50%; transform:translateX(-50%); background:rgba(0,0,0,0.85); border:2px solid #58a6ff; padding:16px 32px; border-radius:12px; text-align:center; min-width:280px;">
            <h2 style="margin:0 0 8px 0; color:#58a6ff;">{ winner_text(&props.score) }</h2>
            <p style="margin:4px 0;">{ format!("Final score: {}", score_line(&props.score)) }</p>
            <div style="margin-top:12px; display:flex; gap:12px; justify-content:center;">
                <button onclick={new_game_btn}>{"New game"}</button>
            </div>
        </div>
    }
}
