use crate::model::ControlScheme;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct HomeProps {
    pub on_host: Callback<ControlScheme>,
    pub on_join: Callback<String>,
    pub join_error: Option<String>,
}

#[function_component]
pub fn Home(props: &HomeProps) -> Html {
    let session_input = use_state(String::new);

    let host_btn = {
        let cb = props.on_host.clone();
        Callback::from(move |_| cb.emit(ControlScheme::Single))
    };
    let local_btn = {
        let cb = props.on_host.clone();
        Callback::from(move |_| cb.emit(ControlScheme::SharedKeyboard))
    };
    let join_btn = {
        let cb = props.on_join.clone();
        let session_input = session_input.clone();
        Callback::from(move |_| cb.emit((*session_input).clone()))
    };
    let oninput = {
        let session_input = session_input.clone();
        Callback::from(move |e: InputEvent| {
            session_input.set(e.target_unchecked_into::<HtmlInputElement>().value());
        })
    };
    let onkeydown = {
        let cb = props.on_join.clone();
        let session_input = session_input.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                cb.emit((*session_input).clone());
            }
        })
    };

    html! {
        <div style="position:absolute; top:50%; left:50%; transform:translate(-50%, -50%); background:rgba(0,0,0,0.87); border:2px solid #30363d; padding:28px 36px; border-radius:14px; max-width:520px; width:90%; box-shadow:0 0 0 1px #1a1f24, 0 6px 18px rgba(0,0,0,0.6); font-size:14px; line-height:1.4;">
            <h2 style="margin:0 0 12px 0; font-size:22px; color:#58a6ff; text-align:center;">{"Footballers"}</h2>
            <p style="margin:4px 0 10px 0; text-align:center; opacity:0.85;">{"Host a match and share the link, or join one with its session id."}</p>
            <div style="display:flex; gap:12px; justify-content:center; margin-top:8px;">
                <button onclick={host_btn}>{"Start game as host"}</button>
                <button onclick={local_btn}>{"Play locally"}</button>
            </div>
            <div style="display:flex; gap:8px; justify-content:center; margin-top:16px;">
                <input
                    type="text"
                    placeholder="Session id"
                    value={(*session_input).clone()}
                    {oninput}
                    {onkeydown}
                />
                <button onclick={join_btn}>{"Join existing"}</button>
            </div>
            { if let Some(err) = &props.join_error { html!{ <div style="margin-top:8px; font-size:12px; color:#f85149; text-align:center;">{ err.clone() }</div> } } else { html!{} } }
            <ul style="margin:14px 0 0 18px; padding:0; list-style:disc; display:flex; flex-direction:column; gap:4px; font-size:12px; opacity:0.7;">
                <li>{"Move with WASD or the arrow keys, shoot with Space."}</li>
                <li>{"Playing locally: red uses WASD + Space, blue uses arrows + Enter."}</li>
            </ul>
        </div>
    }
}
