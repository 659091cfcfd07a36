use yew::{
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct PriorityBadgeProps {
  pub label: &'static str,
  pub style_class: String
}

#[function_component(PriorityBadge)]
pub fn priority_badge(
  props: &PriorityBadgeProps
) -> Html {
  html! {
      <span class={classes!("priority-badge", props.style_class.clone())}>{ props.label }</span>
  }
}
