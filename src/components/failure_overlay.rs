use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct FailureOverlayProps {
    pub reason: Option<String>,
    pub new_game: Callback<()>,
}

/// Shown once the match loop has stopped on an error. There is no resume.
#[function_component]
pub fn FailureOverlay(props: &FailureOverlayProps) -> Html {
    let Some(reason) = &props.reason else {
        return html! {};
    };
    let new_game_btn = {
        let cb = props.new_game.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {
        <div style="position:absolute; top:50%; left:50%; transform:translate(-50%, -50%); background:rgba(0,0,0,0.85); border:2px solid #f85149; padding:24px 32px; border-radius:12px; text-align:center; min-width:320px;">
            <h2 style="margin:0 0 12px 0; color:#f85149;">{"Match stopped"}</h2>
            <p style="margin:4px 0; font-size:13px;">{ reason.clone() }</p>
            <div style="margin-top:16px; display:flex; gap:12px; justify-content:center;">
                <button onclick={new_game_btn}>{"New game"}</button>
            </div>
        </div>
    }
}
