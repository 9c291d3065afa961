use askama::Template;

use super::views::ViewerPageView;

#[derive(Template)]
#[template(path = "pages/viewer.html")]
pub struct ViewerTemplate {
    pub version_info: &'static crate::VersionInfo,
    pub input_placeholder: &'static str,
    pub view: ViewerPageView,
}

pub fn render_template<T: Template>(template: T) -> Result<String, askama::Error> {
    template.render()
}
