use axon_engines::ConfigParser;

/// Renders a full config with the loop-level knobs a test wants to pin down.
pub fn test_config(
    pop_size: i32,
    max_stagnation: i32,
    species_elitism: i32,
    compatibility_threshold: f32,
    reset_on_extinction: bool,
) -> ConfigParser {
    let contents = format!(
        "[NEAT]\n\
         fitness_criterion = max\n\
         fitness_threshold = 1000000.0\n\
         pop_size = {pop_size}\n\
         reset_on_extinction = {reset_on_extinction}\n\
         no_fitness_termination = false\n\
         \n\
         [DefaultStagnation]\n\
         species_fitness_func = max\n\
         max_stagnation = {max_stagnation}\n\
         species_elitism = {species_elitism}\n\
         \n\
         [DefaultReproduction]\n\
         elitism = 2\n\
         survival_threshold = 0.2\n\
         min_species_size = 2\n\
         \n\
         [DefaultSpeciesSet]\n\
         compatibility_threshold = {compatibility_threshold}\n\
         \n\
         [DefaultGenome]\n\
         compatibility_disjoint_coefficient = 1.0\n\
         compatibility_weight_coefficient = 0.5\n\
         conn_add_prob = 0.5\n\
         conn_delete_prob = 0.5\n\
         node_add_prob = 0.2\n\
         node_delete_prob = 0.2\n\
         num_inputs = 2\n\
         num_outputs = 1\n\
         num_hidden = 0\n\
         initial_connection = full_direct\n\
         bias_init_mean = 0.0\n\
         bias_init_stdev = 1.0\n\
         bias_init_type = gaussian\n\
         bias_max_value = 30.0\n\
         bias_min_value = -30.0\n\
         bias_mutate_power = 0.5\n\
         bias_mutate_rate = 0.7\n\
         bias_replace_rate = 0.1\n\
         response_init_mean = 1.0\n\
         response_init_stdev = 0.0\n\
         response_init_type = gaussian\n\
         response_max_value = 30.0\n\
         response_min_value = -30.0\n\
         response_mutate_power = 0.0\n\
         response_mutate_rate = 0.0\n\
         response_replace_rate = 0.0\n\
         weight_init_mean = 0.0\n\
         weight_init_stdev = 1.0\n\
         weight_init_type = gaussian\n\
         weight_max_value = 30.0\n\
         weight_min_value = -30.0\n\
         weight_mutate_power = 0.5\n\
         weight_mutate_rate = 0.8\n\
         weight_replace_rate = 0.1\n\
         activation_default = sigmoid\n\
         activation_mutate_rate = 0.0\n\
         activation_options = sigmoid\n\
         aggregation_default = sum\n\
         aggregation_mutate_rate = 0.0\n\
         aggregation_options = sum\n\
         enabled_default = true\n\
         enabled_mutate_rate = 0.01\n\
         enabled_rate_to_true_add = 0.0\n\
         enabled_rate_to_false_add = 0.0\n"
    );

    ConfigParser::from_str(&contents)
}
