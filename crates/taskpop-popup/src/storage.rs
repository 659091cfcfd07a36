use anyhow::anyhow;
use js_sys::{
  JSON,
  Object,
  Promise,
  Reflect
};
use serde_json::Value;
use taskpop_core::datastore::KeyValueArea;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
  #[wasm_bindgen(
    catch,
    js_namespace = ["chrome", "storage", "local"],
    js_name = get
  )]
  fn chrome_local_get(
    keys: &JsValue
  ) -> Result<Promise, JsValue>;

  #[wasm_bindgen(
    catch,
    js_namespace = ["chrome", "storage", "local"],
    js_name = set
  )]
  fn chrome_local_set(
    items: &JsValue
  ) -> Result<Promise, JsValue>;
}

/// Storage used by the popup:
/// `chrome.storage.local` inside the
/// extension, `localStorage` when the
/// page is opened in a normal tab.
#[derive(Debug, Clone, Copy)]
pub enum PopupArea {
  ChromeLocal,
  WebLocal
}

impl PopupArea {
  pub fn detect() -> Self {
    if chrome_local_available() {
      tracing::info!(
        "using chrome.storage.local"
      );
      Self::ChromeLocal
    } else {
      tracing::warn!(
        "chrome.storage.local \
         unavailable; falling back to \
         window.localStorage"
      );
      Self::WebLocal
    }
  }
}

impl KeyValueArea for PopupArea {
  async fn get(
    &self,
    key: &str
  ) -> anyhow::Result<Option<Value>> {
    match self {
      | Self::ChromeLocal => {
        chrome_get(key).await
      }
      | Self::WebLocal => web_get(key)
    }
  }

  async fn set(
    &mut self,
    key: &str,
    value: Value
  ) -> anyhow::Result<()> {
    match self {
      | Self::ChromeLocal => {
        chrome_set(key, &value).await
      }
      | Self::WebLocal => {
        web_set(key, &value)
      }
    }
  }
}

fn chrome_local_available() -> bool {
  let mut current: JsValue =
    js_sys::global().into();
  for name in
    ["chrome", "storage", "local"]
  {
    match Reflect::get(
      &current,
      &JsValue::from_str(name)
    ) {
      | Ok(next)
        if next.is_object() =>
      {
        current = next;
      }
      | _ => return false
    }
  }
  true
}

async fn chrome_get(
  key: &str
) -> anyhow::Result<Option<Value>> {
  let promise = chrome_local_get(
    &JsValue::from_str(key)
  )
  .map_err(|err| js_error("chrome.storage.local.get", &err))?;
  let items = JsFuture::from(promise)
    .await
    .map_err(|err| js_error("chrome.storage.local.get", &err))?;

  let value = Reflect::get(
    &items,
    &JsValue::from_str(key)
  )
  .map_err(|err| js_error("reading storage result", &err))?;

  if value.is_undefined() {
    return Ok(None);
  }

  from_js(&value).map(Some)
}

async fn chrome_set(
  key: &str,
  value: &Value
) -> anyhow::Result<()> {
  let items = Object::new();
  Reflect::set(
    &items,
    &JsValue::from_str(key),
    &to_js(value)?
  )
  .map_err(|err| js_error("building storage item", &err))?;

  let promise =
    chrome_local_set(&items).map_err(
      |err| {
        js_error(
          "chrome.storage.local.set",
          &err
        )
      }
    )?;
  JsFuture::from(promise)
    .await
    .map_err(|err| js_error("chrome.storage.local.set", &err))?;
  Ok(())
}

fn local_storage()
-> anyhow::Result<web_sys::Storage> {
  web_sys::window()
    .ok_or_else(|| anyhow!("no window"))?
    .local_storage()
    .map_err(|err| js_error("window.localStorage", &err))?
    .ok_or_else(|| {
      anyhow!(
        "localStorage is disabled"
      )
    })
}

fn web_get(
  key: &str
) -> anyhow::Result<Option<Value>> {
  let Some(raw) = local_storage()?
    .get_item(key)
    .map_err(|err| js_error("localStorage.getItem", &err))?
  else {
    return Ok(None);
  };

  let value = serde_json::from_str(&raw)
    .map_err(|err| {
      anyhow!(
        "stored value for {key:?} is \
         not JSON: {err}"
      )
    })?;
  Ok(Some(value))
}

fn web_set(
  key: &str,
  value: &Value
) -> anyhow::Result<()> {
  let json = serde_json::to_string(value)?;
  local_storage()?
    .set_item(key, &json)
    .map_err(|err| js_error("localStorage.setItem", &err))
}

// JSON text is the bridge in both
// directions so integer ids stay
// integers.
fn from_js(
  value: &JsValue
) -> anyhow::Result<Value> {
  let text = JSON::stringify(value)
    .map_err(|err| js_error("JSON.stringify", &err))?;
  let text: String = text.into();
  Ok(serde_json::from_str(&text)?)
}

fn to_js(
  value: &Value
) -> anyhow::Result<JsValue> {
  let text = serde_json::to_string(value)?;
  JSON::parse(&text)
    .map_err(|err| js_error("JSON.parse", &err))
}

fn js_error(
  context: &str,
  err: &JsValue
) -> anyhow::Error {
  let detail = err
    .as_string()
    .or_else(|| {
      Reflect::get(
        err,
        &JsValue::from_str("message")
      )
      .ok()
      .and_then(|message| {
        message.as_string()
      })
    })
    .unwrap_or_else(|| {
      format!("{err:?}")
    });
  anyhow!("{context} failed: {detail}")
}
