use taskpop_core::theme::Theme;

fn body() -> Option<web_sys::HtmlElement> {
  web_sys::window()
    .and_then(|window| {
      window.document()
    })
    .and_then(|document| {
      document.body()
    })
}

pub fn current_theme() -> Theme {
  body()
    .map(|body| {
      Theme::from_class_list(
        &body.class_name()
      )
    })
    .unwrap_or_default()
}

/// Swaps the theme marker on `<body>`.
pub fn apply_theme(theme: Theme) {
  let Some(body) = body() else {
    tracing::warn!(
      "no document body; theme not \
       applied"
    );
    return;
  };

  let classes = body.class_list();
  let [light, dark] = Theme::CLASSES;
  if let Err(error) =
    classes.remove_2(light, dark)
  {
    tracing::error!(?error, "failed clearing theme class");
  }
  if let Err(error) =
    classes.add_1(theme.class())
  {
    tracing::error!(?error, "failed setting theme class");
  }
}
