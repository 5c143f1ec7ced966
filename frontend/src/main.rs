use yew::prelude::*;
use yew_router::prelude::*;

mod api;
mod config;
mod poll_board;
mod poll_create;
mod render_tally;
mod scheduler;
mod storage;
mod styles;

use crate::{poll_board::PollBoard, poll_create::PollCreate};

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")] Board,
    #[at("/create")] CreatePoll,
}

const NAV_LINK: &str = "text-base md:text-lg font-medium px-4 py-2 rounded-md transition-colors duration-200 ease-in-out text-gray-200 border border-transparent hover:border-blue-400 hover:text-blue-400";
const NAV_ACTIVE: &str = "text-blue-400 border-blue-400 ring-2 ring-blue-500 ring-offset-1 ring-offset-gray-900";

#[function_component(Navigation)]
fn navigation() -> Html {
    let current_route = use_route::<Route>();
    let link_class = |route: Route| classes!(
        NAV_LINK,
        if current_route == Some(route) { NAV_ACTIVE } else { "" }
    );

    html! {
        <nav class="bg-gray-900 shadow-lg fixed top-0 w-full z-50">
            <div class="container mx-auto px-6 py-4 flex justify-center space-x-8">
                <Link<Route> to={Route::Board} classes={link_class(Route::Board)}>
                    {"Polls"}
                </Link<Route>>
                <Link<Route> to={Route::CreatePoll} classes={link_class(Route::CreatePoll)}>
                    {"Create Poll"}
                </Link<Route>>
            </div>
        </nav>
    }
}

#[function_component(App)]
fn app() -> Html {
    html! {
        <BrowserRouter>
            <div class="min-h-screen bg-gray-900">
                <Navigation />
                <div class="pt-16">
                    <Switch<Route> render={switch} />
                </div>
            </div>
        </BrowserRouter>
    }
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Board => html! { <PollBoard /> },
        Route::CreatePoll => html! { <PollCreate /> },
    }
}

fn main() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
