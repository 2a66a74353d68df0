use super::*;

impl Default for RubricConfig {
    fn default() -> Self {
        Self {
            max_response_chars: 20_000,
            topics: default_topics(),
            accuracy: AccuracyConfig::default(),
            completeness: CompletenessConfig::default(),
            grade_bands: default_grade_bands(),
            fallback_grade: 6,
            jargon_terms: strings(&[
                "adenosine triphosphate",
                "atp",
                "nadph",
                "thylakoid",
                "stroma",
                "photophosphorylation",
                "calvin cycle",
                "electron transport chain",
                "eukaryotic",
                "prokaryotic",
                "organelle",
                "stoichiometry",
                "thermodynamics",
                "enthalpy",
                "entropy",
                "electromagnetic",
                "quantum",
                "spacetime",
                "relativity",
                "gravitational constant",
                "asymptote",
                "polynomial",
                "derivative",
                "integral",
                "evapotranspiration",
                "lithosphere",
                "asthenosphere",
                "subduction",
            ]),
            age: AgePenaltyConfig::default(),
            safety: SafetyConfig::default(),
        }
    }
}

impl Default for AccuracyConfig {
    fn default() -> Self {
        Self {
            full_coverage_ratio: 0.8,
            no_concept_score: 0.1,
            fallback_ceiling: 0.7,
        }
    }
}

impl Default for CompletenessConfig {
    fn default() -> Self {
        Self {
            min_words: 12,
            target_words: 20,
            under_min_cap: 0.3,
        }
    }
}

impl Default for AgePenaltyConfig {
    fn default() -> Self {
        Self {
            complexity_rate: 2.0,
            simplicity_rate: 0.75,
        }
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            severe_markers: strings(&[
                "fuck",
                "fucking",
                "fucked",
                "motherfucker",
                "shit",
                "bullshit",
                "bitch",
                "bastard",
                "asshole",
                "cunt",
                "whore",
                "slut",
                "retard",
                "retarded",
                "porn",
                "pornography",
                "kill yourself",
                "kys",
                "go die",
            ]),
            flagged_score: 0.0,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: CriterionWeights::default(),
            thresholds: RatingThresholds::default(),
            safety_gate_ceiling: 0.55,
        }
    }
}

impl Default for CriterionWeights {
    fn default() -> Self {
        Self {
            accuracy: 0.40,
            age_appropriateness: 0.10,
            completeness: 0.30,
            safety: 0.20,
        }
    }
}

impl Default for RatingThresholds {
    fn default() -> Self {
        Self {
            excellent: 0.80,
            good: 0.65,
            needs_review: 0.50,
        }
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            evaluator_accuracy_min: 80.0,
            low_quality_bar: 0.70,
            common_notes_limit: 5,
            listing_limit: 5,
            healthy_quality: 0.80,
            healthy_accuracy: 90.0,
            fair_quality: 0.70,
            fair_accuracy: 80.0,
        }
    }
}

fn default_grade_bands() -> Vec<GradeBand> {
    vec![
        GradeBand {
            label: "early elementary".to_string(),
            min_grade: 0,
            max_grade: 2,
            min_words: 5,
            max_words: 120,
            min_avg_word_len: 0.0,
            max_avg_word_len: 4.8,
            max_avg_sentence_words: 12.0,
            jargon_penalty: 0.20,
        },
        GradeBand {
            label: "upper elementary".to_string(),
            min_grade: 3,
            max_grade: 5,
            min_words: 10,
            max_words: 250,
            min_avg_word_len: 3.5,
            max_avg_word_len: 6.0,
            max_avg_sentence_words: 20.0,
            jargon_penalty: 0.15,
        },
        GradeBand {
            label: "middle school".to_string(),
            min_grade: 6,
            max_grade: 8,
            min_words: 15,
            max_words: 350,
            min_avg_word_len: 4.0,
            max_avg_word_len: 6.5,
            max_avg_sentence_words: 25.0,
            jargon_penalty: 0.05,
        },
        GradeBand {
            label: "high school".to_string(),
            min_grade: 9,
            max_grade: 12,
            min_words: 20,
            max_words: 500,
            min_avg_word_len: 4.3,
            max_avg_word_len: 7.0,
            max_avg_sentence_words: 30.0,
            jargon_penalty: 0.0,
        },
        GradeBand {
            label: "college".to_string(),
            min_grade: 13,
            max_grade: 20,
            min_words: 25,
            max_words: 800,
            min_avg_word_len: 4.5,
            max_avg_word_len: 8.0,
            max_avg_sentence_words: 40.0,
            jargon_penalty: 0.0,
        },
    ]
}

fn default_topics() -> Vec<TopicRule> {
    vec![
        topic(
            "photosynthesis",
            &["photosynthesis", "plants make food", "how do plants make"],
            &[
                ("sunlight", &["sunlight", "sun", "light", "sunshine", "light energy"]),
                ("water", &["water"]),
                ("carbon dioxide", &["carbon dioxide", "co2"]),
                ("oxygen", &["oxygen"]),
                ("food", &["food", "sugar", "sugars", "glucose", "energy"]),
                ("chlorophyll", &["chlorophyll", "chloroplast", "chloroplasts", "leaf", "leaves"]),
            ],
        ),
        topic(
            "water cycle",
            &["water cycle", "hydrologic cycle", "rain form", "where does rain"],
            &[
                ("evaporation", &["evaporation", "evaporates", "evaporate"]),
                ("condensation", &["condensation", "condenses", "condense", "clouds", "cloud"]),
                ("precipitation", &["precipitation", "rain", "snow", "falls"]),
                ("collection", &["collection", "collects", "runoff", "oceans", "lakes", "rivers"]),
                ("heat", &["sun", "heat", "warms", "warm"]),
            ],
        ),
        topic(
            "gravity",
            &["gravity", "gravitational", "why do things fall"],
            &[
                ("force", &["force", "pull", "pulls", "attract", "attracts"]),
                ("mass", &["mass", "massive", "heavier", "weight"]),
                ("earth", &["earth", "planet", "ground"]),
                ("distance", &["distance", "closer", "farther", "apart"]),
                ("orbit", &["orbit", "orbits", "moon"]),
            ],
        ),
        topic(
            "fractions",
            &["fraction", "fractions", "numerator", "denominator"],
            &[
                ("parts", &["part", "parts", "piece", "pieces", "equal"]),
                ("whole", &["whole", "one"]),
                ("numerator", &["numerator", "top number"]),
                ("denominator", &["denominator", "bottom number"]),
                ("example", &["half", "1 2", "quarter", "1 4", "pizza"]),
            ],
        ),
        topic(
            "solar system",
            &["solar system", "planets", "orbit the sun"],
            &[
                ("sun", &["sun", "star"]),
                (
                    "planets",
                    &[
                        "planet",
                        "planets",
                        "mercury",
                        "venus",
                        "earth",
                        "mars",
                        "jupiter",
                        "saturn",
                    ],
                ),
                ("orbit", &["orbit", "orbits", "revolve", "circle around"]),
                ("gravity", &["gravity"]),
                ("moons", &["moon", "moons", "asteroid", "asteroids", "comet", "comets"]),
            ],
        ),
        topic(
            "cells",
            &["cell", "cells", "building blocks of life"],
            &[
                ("living things", &["living things", "organisms", "life", "alive"]),
                ("membrane", &["membrane", "cell wall", "outer layer"]),
                ("nucleus", &["nucleus", "dna", "genetic"]),
                (
                    "building block",
                    &[
                        "building block",
                        "building blocks",
                        "smallest unit",
                        "basic unit",
                    ],
                ),
                ("energy", &["energy", "mitochondria", "food"]),
            ],
        ),
        topic(
            "states of matter",
            &["states of matter", "solid liquid", "matter"],
            &[
                ("solid", &["solid", "solids", "ice"]),
                ("liquid", &["liquid", "liquids", "water"]),
                ("gas", &["gas", "gases", "steam", "vapor"]),
                ("particles", &["particles", "molecules", "atoms"]),
                ("temperature", &["heat", "temperature", "melt", "melts", "freeze", "boil"]),
            ],
        ),
        topic(
            "food chain",
            &["food chain", "food web", "predator", "ecosystem"],
            &[
                ("producers", &["producer", "producers", "plants", "grass"]),
                (
                    "consumers",
                    &[
                        "consumer",
                        "consumers",
                        "herbivore",
                        "herbivores",
                        "carnivore",
                        "carnivores",
                    ],
                ),
                ("predators", &["predator", "predators", "prey", "eat", "eats", "eaten"]),
                ("decomposers", &["decomposer", "decomposers", "fungi", "bacteria"]),
                ("energy", &["energy", "sun"]),
            ],
        ),
        topic(
            "volcanoes",
            &["volcano", "volcanoes", "eruption", "erupt"],
            &[
                ("magma", &["magma", "lava", "molten rock"]),
                ("pressure", &["pressure", "gas", "gases"]),
                ("crust", &["crust", "plates", "tectonic", "underground"]),
                ("eruption", &["erupt", "erupts", "eruption", "explode", "bursts"]),
                ("ash", &["ash", "rock", "rocks"]),
            ],
        ),
        topic(
            "multiplication",
            &["multiplication", "multiply", "times table"],
            &[
                ("repeated addition", &["repeated addition", "adding", "add", "groups of"]),
                ("groups", &["group", "groups", "sets", "rows"]),
                ("product", &["product", "answer", "total"]),
                ("example", &["times", "3 x 4", "2 x 3", "x"]),
            ],
        ),
        topic(
            "democracy",
            &["democracy", "government", "voting", "elections"],
            &[
                ("people", &["people", "citizens", "citizen"]),
                ("vote", &["vote", "votes", "voting", "elect", "election", "elections"]),
                (
                    "representatives",
                    &[
                        "representatives",
                        "leaders",
                        "officials",
                        "president",
                        "congress",
                    ],
                ),
                ("rights", &["rights", "freedom", "laws", "law"]),
                ("majority", &["majority", "decide", "decision"]),
            ],
        ),
    ]
}

fn topic(name: &str, keywords: &[&str], concepts: &[(&str, &[&str])]) -> TopicRule {
    TopicRule {
        topic: name.to_string(),
        keywords: strings(keywords),
        concepts: concepts
            .iter()
            .map(|(label, terms)| Concept {
                label: label.to_string(),
                terms: strings(terms),
            })
            .collect(),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
