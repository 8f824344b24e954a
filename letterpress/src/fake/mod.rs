//! Synthetic data for previews
//!
//! Produces values that satisfy a [`Schema`] so that a template can be
//! rendered before any real data exists. Generation is driven by a caller
//! supplied [`Rng`]; use [`generate`] for the thread-local generator.

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{Map, Number, Value};

use crate::schema::Schema;
use crate::template::TemplateClass;

const WORDS: &[&str] = &[
    "alpha", "amber", "anchor", "breeze", "canvas", "cedar", "copper", "delta", "ember",
    "harbor", "juniper", "lantern", "maple", "meadow", "orbit", "pebble", "quartz", "river",
    "saffron", "summit", "timber", "velvet", "willow", "zephyr",
];

const FIRST_NAMES: &[&str] = &[
    "ada", "alan", "grace", "linus", "margaret", "barbara", "dennis", "radia", "ken", "frances",
];

const LAST_NAMES: &[&str] = &[
    "lovelace", "turing", "hopper", "torvalds", "hamilton", "liskov", "ritchie", "perlman",
    "thompson", "allen",
];

/// Generate a value for `schema` using the thread-local generator
#[must_use]
pub fn generate(schema: &Schema) -> Value {
    generate_with(schema, &mut rand::thread_rng())
}

/// Generate a value for `schema` using `rng`
pub fn generate_with<R: Rng + ?Sized>(schema: &Schema, rng: &mut R) -> Value {
    match schema {
        Schema::Any => Value::String(pick(rng, WORDS).to_string()),
        Schema::String {
            allow_blank: _,
            min_length,
            max_length,
        } => Value::String(fake_text(rng, *min_length, *max_length)),
        Schema::Email => Value::String(format!(
            "{}.{}@example.com",
            pick(rng, FIRST_NAMES),
            pick(rng, LAST_NAMES)
        )),
        Schema::Url => Value::String(format!(
            "https://example.com/{}/{}",
            pick(rng, WORDS),
            rng.gen_range(1..10_000)
        )),
        Schema::Int { gte, lte } => {
            let (low, high) = int_bounds(*gte, *lte);
            Value::Number(rng.gen_range(low..=high).into())
        }
        Schema::Float { gte, lte } => {
            let low = gte.unwrap_or_else(|| lte.map_or(0.0, |l| l - 100.0));
            let high = lte.unwrap_or(low + 100.0).max(low);
            let raw = if high > low { rng.gen_range(low..=high) } else { low };
            let rounded = ((raw * 100.0).round() / 100.0).clamp(low, high);
            Number::from_f64(rounded).map_or(Value::Null, Value::Number)
        }
        Schema::Bool => Value::Bool(rng.gen_bool(0.5)),
        Schema::Enum(choices) => choices
            .choose(rng)
            .map_or(Value::Null, |choice| Value::String(choice.clone())),
        Schema::List {
            item,
            min_length,
            max_length,
        } => {
            let high = max_length.unwrap_or(min_length + 3).max(*min_length);
            let count = rng.gen_range(*min_length..=high);
            Value::Array((0..count).map(|_| generate_with(item, rng)).collect())
        }
        Schema::Dict(keys) => Value::Object(
            keys.iter()
                .map(|key| (key.name.clone(), generate_with(&key.schema, rng)))
                .collect(),
        ),
        Schema::Nullable(inner) => generate_with(inner, rng),
    }
}

/// Fake constructor arguments for a template class
#[must_use]
pub fn fake_kwargs(class: &dyn TemplateClass) -> Map<String, Value> {
    fake_kwargs_with(class, &mut rand::thread_rng())
}

/// Fake constructor arguments for a template class using `rng`
pub fn fake_kwargs_with<R: Rng>(class: &dyn TemplateClass, rng: &mut R) -> Map<String, Value> {
    match generate_with(class.kwargs(), rng) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Fake variables for a template class
///
/// Variables are derived from faked kwargs, then any variable carrying its
/// own fake generator is overridden by it.
#[must_use]
pub fn fake_variables(class: &dyn TemplateClass) -> Map<String, Value> {
    fake_variables_with(class, &mut rand::thread_rng())
}

/// Fake variables for a template class using `rng`
pub fn fake_variables_with<R: Rng>(class: &dyn TemplateClass, rng: &mut R) -> Map<String, Value> {
    let kwargs = fake_kwargs_with(class, rng);
    let mut variables = class.get_variables(&kwargs);
    for variable in class.variables() {
        if let Some(fake) = variable.fake {
            variables.insert(variable.name.clone(), fake(rng));
        }
    }
    variables
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, words: &[&'a str]) -> &'a str {
    words.choose(rng).copied().unwrap_or("lorem")
}

fn int_bounds(gte: Option<i64>, lte: Option<i64>) -> (i64, i64) {
    match (gte, lte) {
        (Some(low), Some(high)) => (low, high.max(low)),
        (Some(low), None) => (low, low.saturating_add(100)),
        (None, Some(high)) => (high.saturating_sub(100).max(0).min(high), high),
        (None, None) => (0, 100),
    }
}

fn fake_text<R: Rng + ?Sized>(rng: &mut R, min_length: usize, max_length: Option<usize>) -> String {
    let word_count = rng.gen_range(1..=4);
    let mut text = (0..word_count)
        .map(|_| pick(rng, WORDS))
        .collect::<Vec<_>>()
        .join(" ");

    while text.chars().count() < min_length {
        text.push(' ');
        text.push_str(pick(rng, WORDS));
    }

    if let Some(max_length) = max_length {
        if text.chars().count() > max_length {
            text = text.chars().take(max_length).collect();
        }
    }

    // truncation may leave a trailing space
    if text.ends_with(' ') {
        text.pop();
        text.push('x');
    }
    text
}
