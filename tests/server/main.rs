mod helpers;
mod viewer_pages;
