mod view;

pub use view::TestView;
