use crate::state::SessionDescriptor;
use crate::util::{copy_to_clipboard, join_link};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct SessionPanelProps {
    pub session: SessionDescriptor,
}

#[function_component]
pub fn SessionPanel(props: &SessionPanelProps) -> Html {
    let feedback = use_state(|| None::<String>);

    let copy_cb = {
        let session = props.session.clone();
        let feedback = feedback.clone();
        Callback::from(move |_| {
            let Some(link) = join_link(&session) else {
                feedback.set(Some("Could not build the link".to_string()));
                return;
            };
            let feedback = feedback.clone();
            copy_to_clipboard(link.clone(), move |copied| {
                let msg = if copied {
                    "Link copied".to_string()
                } else {
                    format!("Copy failed, share this link: {link}")
                };
                feedback.set(Some(msg));
            });
        })
    };

    let role = if props.session.is_host() { "Host" } else { "Joined" };
    html! {<div style="position:absolute; top:12px; right:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; min-width:200px; display:flex; flex-direction:column; gap:6px;">
        <div style="font-size:12px;">{ format!("{role} · session ") }<code>{ props.session.session_id() }</code></div>
        <button onclick={copy_cb}>{"Copy shareable link"}</button>
        { if let Some(txt) = &*feedback { html!{ <div style="font-size:11px; line-height:1.2; background:#1c2128; border:1px solid #30363d; padding:4px 6px; border-radius:6px; word-break:break-all;">{ txt.clone() }</div> } } else { html!{} } }
    </div>}
}
