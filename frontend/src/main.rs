use std::fmt::Display;
use std::rc::Rc;

use shared::api::Api;
use shared::session::{Exchange, SessionEvent, SessionState};
use shared::AskRequest;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlTextAreaElement;
use yew::prelude::*;

use crate::rpc::HttpTransport;

mod rpc;

const FAILURE_NOTICE: &str = "Failed to get response from Nix 1. Please try again.";
const SIDEBAR_LIMIT: usize = 10;

#[derive(Default, PartialEq)]
struct Session(SessionState);

impl Reducible for Session {
    type Action = SessionEvent;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = self.0.clone();
        if next.reduce(action) {
            Rc::new(Session(next))
        } else {
            self
        }
    }
}

fn report(context: &str, err: &dyn Display) {
    web_sys::console::error_1(&format!("{context}: {err}").into());
}

fn hydrate(client: HttpTransport, session: UseReducerHandle<Session>) {
    spawn_local(async move {
        match client.recent_conversations().await {
            Ok(resp) => session.dispatch(SessionEvent::Hydrated(resp.conversations)),
            Err(err) => report("Could not load conversations", &err),
        }
    });
}

fn view_exchange(exchange: &Exchange) -> Html {
    html! {
        <div class="exchange">
            <div class="query">{ exchange.query.clone() }</div>
            if exchange.response.is_empty() {
                <div class="response pending">{ "Thinking..." }</div>
            } else {
                <div class="response">
                    { for exchange.response.split('\n').map(|p| html! { <p>{ p.to_owned() }</p> }) }
                </div>
            }
        </div>
    }
}

#[function_component]
fn App() -> Html {
    let session = use_reducer(Session::default);
    let client = use_state(HttpTransport::from_location);

    {
        let session = session.clone();
        let client = (*client).clone();

        use_effect_with_deps(
            move |_| {
                hydrate(client, session);
                || ()
            },
            (),
        );
    }

    let submit = {
        let session = session.clone();
        let client = (*client).clone();

        Callback::from(move |_: ()| {
            let Some(query) = session.0.ready_to_submit() else {
                return;
            };
            session.dispatch(SessionEvent::Submitted {
                query: query.clone(),
                timestamp: js_sys::Date::now() as i64,
            });

            let session = session.clone();
            let client = client.clone();
            spawn_local(async move {
                match client.ask(AskRequest { query }).await {
                    Ok(resp) => {
                        session.dispatch(SessionEvent::Fulfilled {
                            response: resp.response,
                        });
                        hydrate(client, session);
                    }
                    Err(err) => {
                        report("Error calling Nix 1", &err);
                        session.dispatch(SessionEvent::Failed {
                            notice: FAILURE_NOTICE.to_owned(),
                        });
                    }
                }
            });
        })
    };

    let oninput = {
        let session = session.clone();
        Callback::from(move |e: InputEvent| {
            let target: HtmlTextAreaElement = e.target_unchecked_into();
            session.dispatch(SessionEvent::InputChanged(target.value()));
        })
    };

    let onkeydown = {
        let submit = submit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" && !e.shift_key() {
                e.prevent_default();
                submit.emit(());
            }
        })
    };

    let onsubmit = Callback::from(move |e: SubmitEvent| {
        e.prevent_default();
        submit.emit(());
    });

    let clear = {
        let session = session.clone();
        Callback::from(move |_: MouseEvent| session.dispatch(SessionEvent::Cleared))
    };

    let dismiss = {
        let session = session.clone();
        Callback::from(move |_: MouseEvent| session.dispatch(SessionEvent::NoticeDismissed))
    };

    let state = &session.0;

    html! {
        <div class="app">
            <aside class="sidebar">
                <button onclick={clear.clone()}>{ "New chat" }</button>
                if !state.is_empty() {
                    <button onclick={clear}>{ "Clear history" }</button>
                }
                <ul>
                    { for state.recent(SIDEBAR_LIMIT).map(|e| html! { <li>{ e.query.clone() }</li> }) }
                </ul>
            </aside>
            <main>
                if let Some(notice) = state.notice() {
                    <div class="notice" onclick={dismiss}>{ notice.to_owned() }</div>
                }
                if state.is_empty() && !state.in_flight() {
                    <div class="welcome">
                        <h2>{ "How can I help you today?" }</h2>
                        <p>{ "I'm Nix 1, ready to assist you with any questions or tasks." }</p>
                    </div>
                } else {
                    <div class="messages">
                        { for state.exchanges().iter().map(view_exchange) }
                    </div>
                }
                <form {onsubmit}>
                    <textarea
                        value={state.input().to_owned()}
                        {oninput}
                        {onkeydown}
                        placeholder="Message Nix 1..."
                        disabled={state.in_flight()}
                        rows="1"
                    />
                    <button type="submit" disabled={state.ready_to_submit().is_none()}>
                        { if state.in_flight() { "..." } else { "Send" } }
                    </button>
                </form>
                <p class="hint">{ "Press Enter to send, Shift+Enter for new line" }</p>
            </main>
        </div>
    }
}

fn main() {
    yew::Renderer::<App>::new().render();
}
