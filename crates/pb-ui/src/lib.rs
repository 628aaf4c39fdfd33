use askama::Template;
use pb_core::models::HistoryEntry;

/// The unauthenticated entry view. Registration errors re-render this
/// view too, mirroring the combined login/sign-up entry page.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate<'a> {
    pub errors: &'a [String],
}

#[derive(Template)]
#[template(path = "create_account.html")]
pub struct CreateAccountTemplate<'a> {
    pub history: &'a [HistoryEntry],
}

/// The authenticated landing view.
#[derive(Template)]
#[template(path = "homepage.html")]
pub struct HomepageTemplate<'a> {
    pub history: &'a [HistoryEntry],
}

#[derive(Template)]
#[template(path = "park.html")]
pub struct ParkTemplate<'a> {
    pub errors: &'a [String],
    pub history: &'a [HistoryEntry],
}

#[derive(Template)]
#[template(path = "create_post.html")]
pub struct CreatePostTemplate<'a> {
    pub errors: &'a [String],
    pub history: &'a [HistoryEntry],
}
