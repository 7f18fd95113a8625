use axum::response::Html;

const LANDING_PAGE: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Compound catalog</title></head>
<body>
<h1>Compound catalog</h1>
<ul>
  <li><a href="/compound">Compounds</a></li>
  <li><a href="/matrixes">Matrices</a></li>
  <li><a href="/name">Names</a></li>
  <li><a href="/identification">Identifications</a></li>
</ul>
<p><a href="/login">Log in</a> to add or delete records.</p>
<form method="post" action="/logout"><button type="submit">Log out</button></form>
</body>
</html>
"#;

const LOGIN_PAGE: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Log in</title></head>
<body>
<h1>Log in</h1>
<form method="post" action="/login">
  <label>Username <input name="username" autocomplete="username" required></label>
  <label>Password <input name="password" type="password" autocomplete="current-password" required></label>
  <button type="submit">Log in</button>
</form>
</body>
</html>
"#;

pub async fn landing() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

pub fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}
