mod test_utils;
mod test_robotic_arm_ur;
mod test_subtask;
