//! 管理后台模板，`.html` 模板由 tera 自动转义

use axum::response::Html;
use tera::{Context, Tera};

use crate::core::error::CoreError;

const BASE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>{% block title %}Site administration{% endblock title %}</title>
    <meta charset="UTF-8">
    <style>
        body { font-family: Arial, sans-serif; margin: 0; background: #f8f8f8; }
        header { background: #417690; color: #fff; padding: 12px 40px; }
        header a { color: #fff; text-decoration: none; }
        main { max-width: 960px; margin: 24px auto; background: #fff; padding: 24px; border-radius: 4px; }
        table { border-collapse: collapse; width: 100%; }
        th, td { text-align: left; padding: 6px 10px; border-bottom: 1px solid #eee; }
        .errorlist { color: #ba2121; margin: 4px 0; padding-left: 18px; }
        .row { margin: 10px 0; }
        .row label { display: inline-block; width: 120px; }
    </style>
</head>
<body>
    <header><a href="/admin/">Site administration</a></header>
    <main>
    {% block content %}{% endblock content %}
    </main>
</body>
</html>
"#;

const INDEX: &str = r#"{% extends "base.html" %}
{% block content %}
<h1>Site administration</h1>
<table>
    <caption>Users</caption>
    <tr>
        <th><a href="/admin/users/">Users</a></th>
        <td><a href="/admin/users/add/">Add</a></td>
        <td>{{ count }} record{{ count | pluralize }}</td>
    </tr>
</table>
{% endblock content %}
"#;

const CHANGE_LIST: &str = r#"{% extends "base.html" %}
{% block title %}Select user to change{% endblock title %}
{% block content %}
<h1>Select user to change</h1>
<p><a href="/admin/users/add/">Add user</a></p>
<form method="get" action="/admin/users/">
    <input type="text" name="q" value="{{ q }}" autofocus>
    <input type="submit" value="Search">
    {% if q %}<span>{{ count }} result{{ count | pluralize }} (<a href="/admin/users/">{{ total }} total</a>)</span>{% endif %}
</form>
<table id="result_list">
    <thead>
        <tr>{% for column in columns %}<th>{{ column }}</th>{% endfor %}</tr>
    </thead>
    <tbody>
    {% for row in rows %}
        <tr>
            <td><a href="/admin/users/{{ row.id }}/change/">{{ row.first_name }}</a></td>
            <td>{{ row.last_name }}</td>
            <td>{{ row.email }}</td>
            <td>{{ row.sex }}</td>
            <td>{{ row.age }}</td>
        </tr>
    {% endfor %}
    </tbody>
</table>
<p>{{ count }} user{{ count | pluralize }}</p>
{% endblock content %}
"#;

const CHANGE_FORM: &str = r#"{% extends "base.html" %}
{% block title %}{{ title }}{% endblock title %}
{% block content %}
<h1>{{ title }}</h1>
{% if has_errors %}<p class="errornote">Please correct the errors below.</p>{% endif %}
{% if errors.non_field_errors %}
<ul class="errorlist">{% for message in errors.non_field_errors %}<li>{{ message }}</li>{% endfor %}</ul>
{% endif %}
<form method="post" action="{{ action }}">
    {% for field in text_fields %}
    <div class="row">
        <label for="id_{{ field.name }}">{{ field.label }}:</label>
        <input type="text" id="id_{{ field.name }}" name="{{ field.name }}" value="{{ values[field.name] }}" maxlength="30">
        {% if errors[field.name] %}<ul class="errorlist">{% for message in errors[field.name] %}<li>{{ message }}</li>{% endfor %}</ul>{% endif %}
    </div>
    {% endfor %}
    <div class="row">
        <label for="id_sex">Sex:</label>
        <select id="id_sex" name="sex">
            <option value="">---------</option>
            {% for choice in sex_choices %}
            <option value="{{ choice.value }}"{% if values.sex == choice.value %} selected{% endif %}>{{ choice.label }}</option>
            {% endfor %}
        </select>
        {% if errors.sex %}<ul class="errorlist">{% for message in errors.sex %}<li>{{ message }}</li>{% endfor %}</ul>{% endif %}
    </div>
    <div class="row">
        <label for="id_country">Country:</label>
        <select id="id_country" name="country">
            <option value="">---------</option>
            {% for choice in countries %}
            <option value="{{ choice.value }}"{% if values.country == choice.value %} selected{% endif %}>{{ choice.label }}</option>
            {% endfor %}
        </select>
        {% if errors.country %}<ul class="errorlist">{% for message in errors.country %}<li>{{ message }}</li>{% endfor %}</ul>{% endif %}
    </div>
    <input type="submit" value="Save">
</form>
{% if user_id %}<p><a href="/admin/users/{{ user_id }}/delete/">Delete</a></p>{% endif %}
{% endblock content %}
"#;

const DELETE_CONFIRMATION: &str = r#"{% extends "base.html" %}
{% block title %}Are you sure?{% endblock title %}
{% block content %}
<h1>Are you sure?</h1>
<p>Are you sure you want to delete the user "{{ name }}"?</p>
<form method="post" action="/admin/users/{{ user_id }}/delete/">
    <input type="submit" value="Yes, I'm sure">
    <a href="/admin/users/{{ user_id }}/change/">No, take me back</a>
</form>
{% endblock content %}
"#;

pub struct AdminTemplates {
    tera: Tera,
}

impl AdminTemplates {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", BASE),
            ("index.html", INDEX),
            ("change_list.html", CHANGE_LIST),
            ("change_form.html", CHANGE_FORM),
            ("delete_confirmation.html", DELETE_CONFIRMATION),
        ])?;
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<Html<String>, CoreError> {
        Ok(Html(self.tera.render(name, context)?))
    }
}
